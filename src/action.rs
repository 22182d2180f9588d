//! The `Action` field of a statement: `*`, `service:*`, or `service:action`,
//! validated against an ASCII charset rule and matched with the shared
//! glob matcher (C1).

use {
    crate::{display_json, from_str_json, matcher::matches, serutil::StringLikeList, IamError},
    serde::{
        de::{self, Deserializer, Unexpected, Visitor},
        ser::Serializer,
        Deserialize, Serialize,
    },
    std::{
        fmt::{Display, Formatter, Result as FmtResult},
        str::FromStr,
    },
};

/// A single `service:action` pair, or `Any` (`*`).
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Action {
    Any,
    Specific { service: String, action: String },
}

impl Action {
    pub fn new<S1: Into<String>, S2: Into<String>>(service: S1, action: S2) -> Result<Self, IamError> {
        let service = service.into();
        let action = action.into();

        if !is_valid_segment(&service, false) {
            return Err(IamError::validation(format!("invalid action service segment: {}", service)));
        }

        if !is_valid_segment(&action, true) {
            return Err(IamError::validation(format!("invalid action name segment: {}", action)));
        }

        Ok(Self::Specific { service, action })
    }

    #[inline]
    pub fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }

    pub fn service(&self) -> &str {
        match self {
            Self::Any => "*",
            Self::Specific { service, .. } => service,
        }
    }

    pub fn action(&self) -> &str {
        match self {
            Self::Any => "*",
            Self::Specific { action, .. } => action,
        }
    }

    /// Does this action pattern match `service:action`? Each side is matched
    /// independently with the glob matcher, so `ec2:Describe*` matches
    /// `ec2:DescribeSecurityGroups`.
    pub fn matches(&self, service: &str, action: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Specific { service: p_service, action: p_action } => {
                matches(p_service, service) && matches(p_action, action)
            }
        }
    }
}

/// Service/action segments are non-empty ASCII, alphanumeric aside from an
/// internal `-`/`_`; the action segment additionally allows a literal `*`
/// anywhere, since a pattern like `Describe*` is itself a valid action string.
fn is_valid_segment(segment: &str, allow_wildcard: bool) -> bool {
    if segment.is_empty() || !segment.is_ascii() {
        return false;
    }

    let bytes = segment.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        let ok = b.is_ascii_alphanumeric()
            || (allow_wildcard && b == b'*')
            || ((b == b'-' || b == b'_') && i != 0 && i != bytes.len() - 1);
        if !ok {
            return false;
        }
    }

    true
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::Any => f.write_str("*"),
            Self::Specific { service, action } => write!(f, "{}:{}", service, action),
        }
    }
}

impl FromStr for Action {
    type Err = IamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "*" {
            return Ok(Self::Any);
        }

        let parts: Vec<&str> = s.splitn(2, ':').collect();
        if parts.len() != 2 {
            return Err(IamError::validation(format!("invalid action: {}", s)));
        }

        Self::new(parts[0], parts[1])
    }
}

impl<'de> Deserialize<'de> for Action {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ActionVisitor;
        impl<'de> Visitor<'de> for ActionVisitor {
            type Value = Action;

            fn expecting(&self, f: &mut Formatter) -> FmtResult {
                f.write_str("an action string of the form \"service:action\" or \"*\"")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                v.parse().map_err(|_| E::invalid_value(Unexpected::Str(v), &self))
            }
        }

        deserializer.deserialize_str(ActionVisitor)
    }
}

impl Serialize for Action {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

display_json!(Action);
from_str_json!(Action);

/// The `Action` field of a statement: a single pattern or a list of them.
pub type ActionList = StringLikeList<Action>;

#[cfg(test)]
mod tests {
    use {super::*, pretty_assertions::assert_eq};

    #[test_log::test]
    fn test_any() {
        let a = Action::Any;
        assert!(a.is_any());
        assert_eq!(a.service(), "*");
        assert_eq!(a.action(), "*");
    }

    #[test_log::test]
    fn test_from_str() {
        let a: Action = "ec2:DescribeInstances".parse().unwrap();
        assert_eq!(a.service(), "ec2");
        assert_eq!(a.action(), "DescribeInstances");
    }

    #[test_log::test]
    fn test_ec2_describe_bug() {
        let a: Action = "ec2:Describe*".parse().unwrap();
        assert!(a.matches("ec2", "DescribeSecurityGroups"));
        assert!(!a.matches("ec2", "CreateSecurityGroup"));
    }

    #[test_log::test]
    fn test_bad_strings() {
        assert!("ec2".parse::<Action>().is_err());
        assert!(":describe".parse::<Action>().is_err());
        assert!("ec2:".parse::<Action>().is_err());
        assert!("-ec2:describe".parse::<Action>().is_err());
        assert!("ec2-:describe".parse::<Action>().is_err());
        assert!("🦀:describe".parse::<Action>().is_err());
    }

    #[test_log::test]
    fn test_display() {
        assert_eq!(Action::Any.to_string(), "*");
        let a: Action = "s3:GetObject".parse().unwrap();
        assert_eq!(a.to_string(), "s3:GetObject");
    }
}
