use {
    super::{
        boolean::bool_match,
        date::{date_match, DateCmp},
        ipaddr::ip_address_match,
        numeric::{numeric_match, NumericCmp},
        string::{string_match, StringCmp},
    },
    crate::{context::EvalContext, serutil::StringLikeStrList, IamError},
    serde::{Deserialize, Serialize},
    std::{
        collections::BTreeMap,
        fmt::{Display, Formatter, Result as FmtResult},
        str::FromStr,
    },
};

/// The set of condition operators required by the policy language (§4.3):
/// no `IfExists` modifier, no `Arn`/`Binary`/`Null` operators.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ConditionOperator {
    String(StringCmp, bool),
    Numeric(NumericCmp),
    Date(DateCmp),
    IpAddress,
    Bool,
}

impl ConditionOperator {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::String(cmp, negated) => cmp.display_name(*negated),
            Self::Numeric(cmp) => cmp.display_name(),
            Self::Date(cmp) => cmp.display_name(),
            Self::IpAddress => "IpAddress",
            Self::Bool => "Bool",
        }
    }

    /// Evaluate this operator's block: every `(contextKey, expectedValues)`
    /// pair must pass (§4.3: "An operator passes iff every ... passes").
    pub fn matches(&self, block: &BTreeMap<String, StringLikeStrList>, ctx: &EvalContext) -> bool {
        block.iter().all(|(key, allowed)| match self {
            Self::String(cmp, negated) => string_match(ctx, key, allowed, *cmp, *negated),
            Self::Numeric(cmp) => numeric_match(ctx, key, allowed, *cmp),
            Self::Date(cmp) => date_match(ctx, key, allowed, *cmp),
            Self::IpAddress => ip_address_match(ctx, key, allowed),
            Self::Bool => bool_match(ctx, key, allowed),
        })
    }
}

impl Display for ConditionOperator {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        f.write_str(self.display_name())
    }
}

impl FromStr for ConditionOperator {
    type Err = IamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "StringEquals" => Ok(Self::String(StringCmp::Equals, false)),
            "StringNotEquals" => Ok(Self::String(StringCmp::Equals, true)),
            "StringLike" => Ok(Self::String(StringCmp::Like, false)),
            "StringNotLike" => Ok(Self::String(StringCmp::Like, true)),
            "NumericEquals" => Ok(Self::Numeric(NumericCmp::Equals)),
            "NumericNotEquals" => Ok(Self::Numeric(NumericCmp::NotEquals)),
            "NumericLessThan" => Ok(Self::Numeric(NumericCmp::LessThan)),
            "NumericGreaterThan" => Ok(Self::Numeric(NumericCmp::GreaterThan)),
            "DateGreaterThan" => Ok(Self::Date(DateCmp::GreaterThan)),
            "DateLessThan" => Ok(Self::Date(DateCmp::LessThan)),
            "IpAddress" => Ok(Self::IpAddress),
            "Bool" => Ok(Self::Bool),
            _ => Err(IamError::validation(format!("invalid condition operator: {}", s))),
        }
    }
}

impl<'de> Deserialize<'de> for ConditionOperator {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ConditionOperator::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl Serialize for ConditionOperator {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use {super::*, pretty_assertions::assert_eq};

    #[test_log::test]
    fn test_round_trip_names() {
        for name in [
            "StringEquals",
            "StringNotEquals",
            "StringLike",
            "StringNotLike",
            "NumericEquals",
            "NumericNotEquals",
            "NumericLessThan",
            "NumericGreaterThan",
            "DateGreaterThan",
            "DateLessThan",
            "IpAddress",
            "Bool",
        ] {
            let op = ConditionOperator::from_str(name).unwrap();
            assert_eq!(op.to_string(), name);
        }
    }

    #[test_log::test]
    fn test_unknown_operator() {
        assert!(ConditionOperator::from_str("ArnEquals").is_err());
    }
}
