//! Common macro for implementing numeric server-assigned ID wrappers.

macro_rules! impl_numeric_id {
    ($($name:ident),* $(,)?) => {
        $(
            impl $name {
                pub fn new(value: i64) -> Self {
                    Self(value)
                }

                pub fn value(&self) -> i64 {
                    self.0
                }
            }

            impl std::fmt::Display for $name {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    write!(f, "{}", self.0)
                }
            }

            impl From<i64> for $name {
                fn from(value: i64) -> Self {
                    Self(value)
                }
            }

            impl std::str::FromStr for $name {
                type Err = std::num::ParseIntError;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    s.trim().parse::<i64>().map(Self)
                }
            }
        )*
    };
}

pub(crate) use impl_numeric_id;
