//! The `Principal` field of a trust-policy statement: either `*` (any
//! principal) or a map of principal type to one-or-many identifier
//! patterns.

use {
    crate::{display_json, matcher::matches, serutil::StringLikeStrList, IamError},
    serde::{
        de::{self, value::MapAccessDeserializer, Deserializer, MapAccess, Unexpected, Visitor},
        ser::{SerializeMap, Serializer},
        Deserialize, Serialize,
    },
    std::{
        collections::BTreeMap,
        fmt::{Display, Formatter, Result as FmtResult},
        str::FromStr,
    },
};

/// The kind of identifier a principal pattern is matched against.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum PrincipalType {
    Aws,
    Service,
    Federated,
    CanonicalUser,
}

impl Display for PrincipalType {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        f.write_str(match self {
            Self::Aws => "AWS",
            Self::Service => "Service",
            Self::Federated => "Federated",
            Self::CanonicalUser => "CanonicalUser",
        })
    }
}

impl FromStr for PrincipalType {
    type Err = IamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AWS" => Ok(Self::Aws),
            "Service" => Ok(Self::Service),
            "Federated" => Ok(Self::Federated),
            "CanonicalUser" => Ok(Self::CanonicalUser),
            _ => Err(IamError::validation(format!("invalid principal type: {}", s))),
        }
    }
}

/// The identity attempting to assume a role, for trust-policy evaluation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Actor {
    pub principal_type: PrincipalType,
    /// The identifier compared against the trust document's patterns: a
    /// 12-digit account id or a full `arn:aws:iam::account:user/name` /
    /// `arn:aws:iam::account:role/name` string for `PrincipalType::Aws`,
    /// the service principal name (e.g. `ec2.amazonaws.com`) for `Service`.
    pub identifier: String,
}

impl Actor {
    pub fn aws<S: Into<String>>(identifier: S) -> Self {
        Self { principal_type: PrincipalType::Aws, identifier: identifier.into() }
    }
}

/// A principal statement: `*`, or a map of principal type to pattern(s).
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Principal {
    Any,
    Specified(BTreeMap<PrincipalType, StringLikeStrList>),
}

impl Principal {
    #[inline]
    pub fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }

    /// Does this `Principal` admit `actor`?
    pub fn matches(&self, actor: &Actor) -> bool {
        match self {
            Self::Any => true,
            Self::Specified(map) => match map.get(&actor.principal_type) {
                None => false,
                Some(patterns) => patterns.iter().any(|p| p == "*" || matches(p, &actor.identifier)),
            },
        }
    }
}

struct PrincipalVisitor;

impl<'de> Visitor<'de> for PrincipalVisitor {
    type Value = Principal;

    fn expecting(&self, f: &mut Formatter) -> FmtResult {
        f.write_str("\"*\" or a map of principal type to identifier pattern(s)")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        if v == "*" {
            Ok(Principal::Any)
        } else {
            Err(E::invalid_value(Unexpected::Str(v), &self))
        }
    }

    fn visit_map<A>(self, access: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let raw: BTreeMap<String, StringLikeStrList> = Deserialize::deserialize(MapAccessDeserializer::new(access))?;
        let mut map = BTreeMap::new();
        for (k, v) in raw {
            let pt = PrincipalType::from_str(&k).map_err(de::Error::custom)?;
            map.insert(pt, v);
        }

        Ok(Principal::Specified(map))
    }
}

impl<'de> Deserialize<'de> for Principal {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(PrincipalVisitor)
    }
}

impl Serialize for Principal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Any => serializer.serialize_str("*"),
            Self::Specified(map) => {
                let mut ser_map = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    ser_map.serialize_entry(&k.to_string(), v)?;
                }
                ser_map.end()
            }
        }
    }
}

display_json!(Principal);

#[cfg(test)]
mod tests {
    use {super::*, pretty_assertions::assert_eq};

    #[test_log::test]
    fn test_any_matches_anything() {
        let p = Principal::Any;
        assert!(p.matches(&Actor::aws("123456789012")));
    }

    #[test_log::test]
    fn test_specified_exact_match() {
        let mut map = BTreeMap::new();
        map.insert(PrincipalType::Aws, StringLikeStrList::Single("arn:aws:iam::123456789012:user/u".to_string()));
        let p = Principal::Specified(map);

        assert!(p.matches(&Actor::aws("arn:aws:iam::123456789012:user/u")));
        assert!(!p.matches(&Actor::aws("arn:aws:iam::999999999999:user/other")));
    }

    #[test_log::test]
    fn test_specified_account_wildcard() {
        let mut map = BTreeMap::new();
        map.insert(PrincipalType::Aws, StringLikeStrList::Single("123456789012".to_string()));
        let p = Principal::Specified(map);

        assert!(p.matches(&Actor::aws("123456789012")));
        assert!(!p.matches(&Actor { principal_type: PrincipalType::Service, identifier: "ec2.amazonaws.com".into() }));
    }

    #[test_log::test]
    fn test_json_round_trip() {
        let p: Principal = serde_json::from_str(r#"{"AWS": "123456789012"}"#).unwrap();
        assert!(p.matches(&Actor::aws("123456789012")));
    }
}
