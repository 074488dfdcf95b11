#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// A layer id was used that the order table does not know about.
    UnregisteredLayer(String),
    DuplicateLayer(String),
    EmptyLayerId,
    LayerAlreadyAttached(String),
    MissingAnchor(String),
    MapNotReady,
    InvalidOdData(String),
    InvalidRoute(String),
    Savefile(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainError::UnregisteredLayer(id) => {
                write!(f, "Layer ID {} not defined in the layer order table", id)
            }
            DomainError::DuplicateLayer(id) => {
                write!(f, "Layer ID {} appears more than once in the layer order table", id)
            }
            DomainError::EmptyLayerId => {
                write!(f, "Layer IDs must not be empty")
            }
            DomainError::LayerAlreadyAttached(id) => {
                write!(f, "Layer {} is already attached to the map", id)
            }
            DomainError::MissingAnchor(id) => {
                write!(f, "Cannot insert before {}: layer is not attached", id)
            }
            DomainError::MapNotReady => {
                write!(f, "Map is not ready")
            }
            DomainError::InvalidOdData(msg) => {
                write!(f, "Invalid OD data: {}", msg)
            }
            DomainError::InvalidRoute(msg) => {
                write!(f, "Invalid route: {}", msg)
            }
            DomainError::Savefile(msg) => {
                write!(f, "Savefile error: {}", msg)
            }
        }
    }
}

impl std::error::Error for DomainError {}

pub type DomainResult<T> = Result<T, DomainError>;
