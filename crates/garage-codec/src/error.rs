/// Errors from capturing container contents.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// The container holds at least one weapon-capable item.
    #[error("container holds a weapon: {template}")]
    WeaponPresent { template: String },
}
