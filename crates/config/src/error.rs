//! Configuration errors.
use alloy_primitives::ChainId;
use figment::Source;

/// Config extraction failed.
///
/// Lists every distinct problem once, prefixed with the layer it came from: the config file,
/// the environment, or the built-in defaults.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[error("failed to extract wallet config:\n{}", .issues.join("\n"))]
pub struct ExtractConfigError {
    issues: Vec<String>,
    #[source]
    error: figment::Error,
}

impl ExtractConfigError {
    pub fn new(error: figment::Error) -> Self {
        let mut issues: Vec<String> = Vec::with_capacity(error.count());
        for err in error.clone() {
            let issue = describe(&err);
            if !issues.contains(&issue) {
                issues.push(issue);
            }
        }
        Self { issues, error }
    }

    /// The distinct problems, one line each.
    pub fn issues(&self) -> &[String] {
        &self.issues
    }
}

fn describe(err: &figment::Error) -> String {
    let origin = match err.metadata.as_ref() {
        Some(meta) => match &meta.source {
            Some(Source::File(path)) => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            _ => meta.name.to_string(),
        },
        None => "wallet config".to_string(),
    };
    let kind = &err.kind;
    if err.path.is_empty() {
        format!("{origin}: {kind}")
    } else {
        format!("{origin}: {kind} for setting `{}`", err.path.join("."))
    }
}

/// Errors raised while building an [`AppChainRegistry`](crate::AppChainRegistry).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ChainConfigError {
    #[error("chain id 0 is reserved for unparsable chain identifiers")]
    ZeroChainId,
    #[error("chain {0} is configured more than once")]
    DuplicateChain(ChainId),
    #[error("chain entry {key} carries a definition for chain {chain}")]
    MismatchedChainId { key: ChainId, chain: ChainId },
    #[error("default chain {0} has no configuration")]
    MissingDefault(ChainId),
}
