//! ARN parsing and resource pattern matching: a pattern is matched
//! segment-by-segment against a concrete ARN using the same glob matcher
//! used for actions (C1), rather than one regex over the whole string.

use {
    crate::{display_json, from_str_json, serutil::StringLikeList, matcher::matches, IamError},
    serde::{
        de::{self, Deserializer, Unexpected, Visitor},
        ser::Serializer,
        Deserialize, Serialize,
    },
    std::fmt::{Display, Formatter, Result as FmtResult},
};

/// A concrete Amazon Resource Name: `arn:<partition>:<service>:<region>:<account_id>:<resource>`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Arn {
    pub partition: String,
    pub service: String,
    pub region: String,
    pub account_id: String,
    pub resource: String,
}

impl Arn {
    pub fn new<S1, S2, S3, S4, S5>(partition: S1, service: S2, region: S3, account_id: S4, resource: S5) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
        S4: Into<String>,
        S5: Into<String>,
    {
        Self {
            partition: partition.into(),
            service: service.into(),
            region: region.into(),
            account_id: account_id.into(),
            resource: resource.into(),
        }
    }
}

impl Display for Arn {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "arn:{}:{}:{}:{}:{}", self.partition, self.service, self.region, self.account_id, self.resource)
    }
}

impl std::str::FromStr for Arn {
    type Err = IamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.splitn(6, ':').collect();
        if parts.len() != 6 || parts[0] != "arn" {
            return Err(IamError::validation(format!("invalid ARN: {}", s)));
        }

        Ok(Self::new(parts[1], parts[2], parts[3], parts[4], parts[5]))
    }
}

/// A single element of a `Resource` field: `*` or an ARN pattern with glob
/// wildcards permitted in any segment.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Resource {
    Any,
    Pattern(String),
}

impl Resource {
    pub fn matches(&self, candidate: &Arn) -> bool {
        match self {
            Self::Any => true,
            Self::Pattern(pattern) => {
                if pattern == "*" {
                    return true;
                }

                let parts: Vec<&str> = pattern.splitn(6, ':').collect();
                if parts.len() != 6 || parts[0] != "arn" {
                    log::trace!("resource pattern {} is not a well-formed ARN pattern", pattern);
                    return false;
                }

                matches(parts[1], &candidate.partition)
                    && matches(parts[2], &candidate.service)
                    && matches(parts[3], &candidate.region)
                    && matches(parts[4], &candidate.account_id)
                    && matches(parts[5], &candidate.resource)
            }
        }
    }
}

impl Display for Resource {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::Any => f.write_str("*"),
            Self::Pattern(p) => f.write_str(p),
        }
    }
}

impl std::str::FromStr for Resource {
    type Err = IamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "*" {
            return Ok(Self::Any);
        }

        if !s.starts_with("arn:") {
            return Err(IamError::validation(format!("invalid resource pattern: {}", s)));
        }

        Ok(Self::Pattern(s.to_string()))
    }
}

impl<'de> Deserialize<'de> for Resource {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ResourceVisitor;
        impl<'de> Visitor<'de> for ResourceVisitor {
            type Value = Resource;

            fn expecting(&self, f: &mut Formatter) -> FmtResult {
                f.write_str("a resource pattern string")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                v.parse().map_err(|_| E::invalid_value(Unexpected::Str(v), &self))
            }
        }

        deserializer.deserialize_str(ResourceVisitor)
    }
}

impl Serialize for Resource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

display_json!(Resource);
from_str_json!(Resource);

/// The `Resource` field of a statement: a single pattern or a list of them.
pub type ResourceList = StringLikeList<Resource>;
