/// Gateway operations, each addressed by a path suffix under the base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Init,
    Payment,
    GetState,
    AddCustomer,
    RemoveCustomer,
    GetCustomer,
    AddCard,
    RemoveCard,
    GetCardList,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Self::Init => "Init",
            Self::Payment => "Payment",
            Self::GetState => "GetState",
            Self::AddCustomer => "AddCustomer",
            Self::RemoveCustomer => "RemoveCustomer",
            Self::GetCustomer => "GetCustomer",
            Self::AddCard => "AddCard",
            Self::RemoveCard => "RemoveCard",
            Self::GetCardList => "GetCardList",
        }
    }

    /// Card binding answers with a redirect to the card form, which must
    /// reach the caller instead of being followed.
    pub fn follows_redirects(self) -> bool {
        !matches!(self, Self::AddCard)
    }
}
