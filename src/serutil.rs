use {
    serde::{
        de::{self, value::SeqAccessDeserializer, Deserializer, SeqAccess, Visitor},
        ser::{SerializeSeq, Serializer},
        Deserialize, Serialize,
    },
    std::{
        fmt::{Debug, Formatter, Result as FmtResult},
        marker::PhantomData,
        str::FromStr,
    },
};

/// Implement Display for a given class by formatting it as pretty-printed JSON.
#[macro_export]
macro_rules! display_json {
    ($cls:ident) => {
        impl std::fmt::Display for $cls {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                let buf = Vec::new();
                let serde_formatter = ::serde_json::ser::PrettyFormatter::with_indent(b"    ");
                let mut ser = ::serde_json::Serializer::with_formatter(buf, serde_formatter);
                match self.serialize(&mut ser) {
                    Ok(()) => (),
                    Err(e) => {
                        ::log::error!("Failed to serialize: {}", e);
                        return Err(::std::fmt::Error {});
                    }
                };
                match std::str::from_utf8(&ser.into_inner()) {
                    Ok(s) => write!(f, "{}", s),
                    Err(e) => {
                        ::log::error!("JSON serialization contained non-UTF-8 characters: {}", e);
                        Err(::std::fmt::Error {})
                    }
                }
            }
        }
    };
}

/// Implement FromStr for a given class by parsing it as JSON.
#[macro_export]
macro_rules! from_str_json {
    ($cls:ident) => {
        impl ::std::str::FromStr for $cls {
            type Err = ::serde_json::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match ::serde_json::from_str::<Self>(s) {
                    Ok(result) => Ok(result),
                    Err(e) => {
                        ::log::debug!("Failed to parse: {}: {:?}", s, e);
                        Err(e)
                    }
                }
            }
        }
    };
}

/// A JSON field that may be a single string-like element or a list of them —
/// the `Action`/`Resource` field shape from the policy document grammar.
/// `T` is the element type; it round-trips through `FromStr`/`Display` the
/// same way the element itself is serialized.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StringLikeList<T> {
    Single(T),
    List(Vec<T>),
}

impl<T> StringLikeList<T> {
    pub fn to_vec(&self) -> Vec<&T> {
        match self {
            Self::Single(t) => vec![t],
            Self::List(list) => list.iter().collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.to_vec().into_iter()
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Single(_) => false,
            Self::List(list) => list.is_empty(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::List(list) => list.len(),
        }
    }
}

impl<T> From<T> for StringLikeList<T> {
    fn from(t: T) -> Self {
        Self::Single(t)
    }
}

impl<T> From<Vec<T>> for StringLikeList<T> {
    fn from(list: Vec<T>) -> Self {
        Self::List(list)
    }
}

impl<'de, T> Deserialize<'de> for StringLikeList<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ListVisitor<T> {
            marker: PhantomData<T>,
        }

        impl<'de, T> Visitor<'de> for ListVisitor<T>
        where
            T: Deserialize<'de>,
        {
            type Value = StringLikeList<T>;

            fn expecting(&self, f: &mut Formatter) -> FmtResult {
                f.write_str("a string-like value or a list of them")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                let element = T::deserialize(serde::de::value::StrDeserializer::new(v))?;
                Ok(StringLikeList::Single(element))
            }

            fn visit_seq<A>(self, seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let list = Vec::<T>::deserialize(SeqAccessDeserializer::new(seq))?;
                Ok(StringLikeList::List(list))
            }
        }

        deserializer.deserialize_any(ListVisitor { marker: PhantomData })
    }
}

impl<T> Serialize for StringLikeList<T>
where
    T: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Single(t) => t.serialize(serializer),
            Self::List(list) => {
                let mut seq = serializer.serialize_seq(Some(list.len()))?;
                for t in list {
                    seq.serialize_element(t)?;
                }
                seq.end()
            }
        }
    }
}

/// A list of raw strings accepted either as a bare value or as a list —
/// used for condition-block expected-value sets (§4.3's multi-value `v`).
pub type StringLikeStrList = StringLikeList<String>;

/// Parse a condition-block expected value (string or list of strings) into
/// owned `String`s via `FromStr` on the element type `T`, for callers that
/// store expected values as typed values (e.g. numbers, dates) but accept
/// the same single-or-list JSON shape.
pub fn parse_string_like_list<T: FromStr>(values: &StringLikeStrList) -> Vec<Result<T, T::Err>> {
    values.iter().map(|s| s.parse()).collect()
}

#[cfg(test)]
mod tests {
    use {super::*, pretty_assertions::assert_eq};

    #[test_log::test]
    fn test_single_round_trip() {
        let list: StringLikeStrList = serde_json::from_str(r#""a""#).unwrap();
        assert_eq!(list, StringLikeList::Single("a".to_string()));
        assert_eq!(serde_json::to_string(&list).unwrap(), r#""a""#);
    }

    #[test_log::test]
    fn test_list_round_trip() {
        let list: StringLikeStrList = serde_json::from_str(r#"["a", "b"]"#).unwrap();
        assert_eq!(list, StringLikeList::List(vec!["a".to_string(), "b".to_string()]));
        assert_eq!(serde_json::to_string(&list).unwrap(), r#"["a","b"]"#);
    }

    #[test_log::test]
    fn test_to_vec() {
        let single = StringLikeList::Single("a".to_string());
        assert_eq!(single.to_vec(), vec![&"a".to_string()]);
        assert_eq!(single.len(), 1);
        assert!(!single.is_empty());
    }
}
