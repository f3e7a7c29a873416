//! Enumerations stored as PostgreSQL enum types.
//!
//! Every enum is persisted through a `CREATE TYPE ... AS ENUM` of the same
//! name and serialized in `snake_case`. `FromStr` accepts the same spelling
//! so blank-tolerant query filters can parse them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

macro_rules! pg_enum {
    (
        $(#[$meta:meta])*
        $name:ident ($type_name:literal) {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
        #[sqlx(type_name = $type_name, rename_all = "snake_case")]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(format!("unknown {} `{}`", $type_name, other)),
                }
            }
        }
    };
}

pg_enum!(
    UserRole("user_role") {
        Student => "student",
        Teacher => "teacher",
        Admin => "admin",
    }
);

pg_enum!(
    UserStatus("user_status") {
        Pending => "pending",
        Active => "active",
        Inactive => "inactive",
    }
);

pg_enum!(
    /// How a student attends, or how a batch is delivered.
    ClassType("class_type") {
        Online => "online",
        Physical => "physical",
        Both => "both",
    }
);

pg_enum!(
    RegistrationType("registration_type") {
        /// Applicant new to the institute.
        New => "new",
        /// Student already enrolled who needs an account.
        Existing => "existing",
    }
);

pg_enum!(
    /// Lifecycle of a registration request. `Accepted` and `Rejected` are terminal.
    RegistrationStatus("registration_status") {
        Pending => "pending",
        Accepted => "accepted",
        Rejected => "rejected",
    }
);

pg_enum!(
    PaymentStatus("payment_status") {
        Pending => "pending",
        Paid => "paid",
        Failed => "failed",
    }
);

pg_enum!(
    /// Lifecycle of a class session. Only `Scheduled` may transition.
    SessionStatus("session_status") {
        Scheduled => "scheduled",
        Completed => "completed",
        Cancelled => "cancelled",
    }
);

impl RegistrationStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RegistrationStatus::Pending)
    }
}

impl SessionStatus {
    /// Allowed transitions: scheduled -> completed | cancelled.
    pub fn can_transition_to(&self, next: SessionStatus) -> bool {
        matches!(
            (self, next),
            (SessionStatus::Scheduled, SessionStatus::Completed)
                | (SessionStatus::Scheduled, SessionStatus::Cancelled)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_terminal_states() {
        assert!(!RegistrationStatus::Pending.is_terminal());
        assert!(RegistrationStatus::Accepted.is_terminal());
        assert!(RegistrationStatus::Rejected.is_terminal());
    }

    #[test]
    fn test_session_transitions() {
        use SessionStatus::*;
        assert!(Scheduled.can_transition_to(Completed));
        assert!(Scheduled.can_transition_to(Cancelled));
        assert!(!Scheduled.can_transition_to(Scheduled));
        assert!(!Completed.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Scheduled));
    }

    #[test]
    fn test_string_forms_agree_with_serde() {
        assert_eq!("physical".parse::<ClassType>().unwrap(), ClassType::Physical);
        assert_eq!(
            serde_json::to_string(&RegistrationType::Existing).unwrap(),
            "\"existing\""
        );
        assert_eq!(PaymentStatus::Paid.to_string(), "paid");
        assert!("archived".parse::<UserStatus>().is_err());
    }
}
