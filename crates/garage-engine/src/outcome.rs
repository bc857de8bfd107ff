use garage_types::{EntityId, StoredAssetRecord};

// ---------------------------------------------------------------------------
// Deposit
// ---------------------------------------------------------------------------

/// Result of a deposit request. Every variant except [`Self::Stored`] leaves
/// both the world and the owner's records untouched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DepositOutcome {
    /// The vehicle was recorded at `index` and removed from the world.
    Stored { index: usize },
    /// No vehicle the requester holds a key for is within the storage radius.
    OutOfRange,
    /// Someone is sitting in the vehicle.
    Occupied,
    /// The vehicle's inventory holds a weapon.
    WeaponsPresent { template: String },
    /// The owner already has the maximum number of stored vehicles.
    CapacityExceeded,
    /// The owner's records could not be read.
    RecordsUnavailable,
    /// The updated records could not be written.
    PersistFailed,
}

impl DepositOutcome {
    pub fn is_stored(&self) -> bool {
        matches!(self, Self::Stored { .. })
    }

    /// Text shown to the requesting player, if any.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            Self::Stored { .. } => Some("Your vehicle has been stored."),
            Self::OutOfRange => Some("Your vehicle is not within the storage radius"),
            Self::Occupied => None,
            Self::WeaponsPresent { .. } => {
                Some("Weapons in compartment, please remove before storage.")
            }
            Self::CapacityExceeded => Some("Garage is full, can't store more vehicles."),
            Self::RecordsUnavailable | Self::PersistFailed => {
                Some("Garage records are unavailable, your vehicle was not stored.")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Retrieve
// ---------------------------------------------------------------------------

/// Why a retrieval did nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Unchanged {
    /// The owner has no stored vehicles.
    NoRecords,
    /// The requested index is past the end of the owner's records.
    IndexOutOfRange,
    /// The owner's records could not be read.
    RecordsUnavailable,
    /// The vehicle could not be rebuilt in the world.
    SpawnFailed,
}

/// Result of a retrieve request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RetrieveOutcome {
    /// The vehicle now exists in the world and its record is gone.
    Retrieved { vehicle: EntityId },
    /// Another vehicle is parked on the spawn point.
    SiteBlocked,
    /// The vehicle was rebuilt but the records could not be written, so it
    /// was removed again and the record kept.
    PersistFailed,
    /// Nothing happened.
    Unchanged(Unchanged),
}

impl RetrieveOutcome {
    pub fn is_retrieved(&self) -> bool {
        matches!(self, Self::Retrieved { .. })
    }

    /// Text shown to the requesting player, if any.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            Self::Retrieved { .. } => Some("Your vehicle has been removed from the garage."),
            Self::SiteBlocked => Some("Can't spawn vehicle, area blocked."),
            Self::PersistFailed => {
                Some("Garage records are unavailable, your vehicle stays in the garage.")
            }
            Self::Unchanged(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Discard
// ---------------------------------------------------------------------------

/// Result of deleting a record without spawning it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiscardOutcome {
    Discarded(StoredAssetRecord),
    IndexOutOfRange,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silent_outcomes() {
        assert!(DepositOutcome::Occupied.message().is_none());
        for reason in [
            Unchanged::NoRecords,
            Unchanged::IndexOutOfRange,
            Unchanged::RecordsUnavailable,
            Unchanged::SpawnFailed,
        ] {
            assert!(RetrieveOutcome::Unchanged(reason).message().is_none());
        }
    }

    #[test]
    fn player_facing_text() {
        assert_eq!(
            DepositOutcome::CapacityExceeded.message(),
            Some("Garage is full, can't store more vehicles.")
        );
        assert_eq!(
            RetrieveOutcome::SiteBlocked.message(),
            Some("Can't spawn vehicle, area blocked.")
        );
        assert!(DepositOutcome::Stored { index: 0 }.is_stored());
        assert!(!DepositOutcome::OutOfRange.is_stored());
        assert!(RetrieveOutcome::Retrieved { vehicle: EntityId(3) }.is_retrieved());
    }
}
