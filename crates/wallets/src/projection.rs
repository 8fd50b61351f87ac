use crate::wallet::{EmbeddedWallet, ExternalWallet, LinkedWallet};

/// The linked subset of the provider's wallets, with the first wallet of each kind.
#[derive(Clone, Debug, Default)]
pub struct WalletSetProjection {
    /// Linked wallets, in provider order.
    pub linked: Vec<LinkedWallet>,
    pub embedded: Option<EmbeddedWallet>,
    pub external: Option<ExternalWallet>,
}

impl WalletSetProjection {
    pub fn is_empty(&self) -> bool {
        self.linked.is_empty()
    }
}

/// Projects the provider's wallet list. First match wins for each kind.
pub fn project(wallets: &[LinkedWallet]) -> WalletSetProjection {
    let linked: Vec<_> = wallets.iter().filter(|w| w.is_linked()).cloned().collect();
    let embedded = linked.iter().find_map(|w| match w {
        LinkedWallet::Embedded(w) => Some(w.clone()),
        LinkedWallet::External(_) => None,
    });
    let external = linked.iter().find_map(|w| match w {
        LinkedWallet::External(w) => Some(w.clone()),
        LinkedWallet::Embedded(_) => None,
    });
    WalletSetProjection { linked, embedded, external }
}
