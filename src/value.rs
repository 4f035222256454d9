//! Conversion between environment strings and field types.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// A type that can be read from a single environment variable
///
/// Implemented for strings, paths, the numeric primitives, `bool`, `char`,
/// `Duration`, IP and socket addresses, `Option<T>` and comma separated
/// `Vec<T>`. Other types can be loaded with `#[field(parse_with = ...)]`.
pub trait EnvValue: Sized {
    /// Parse the raw environment string
    fn parse_env(raw: &str) -> Result<Self, String>;

    /// Render the value for diagnostic output
    fn render(&self) -> String;
}

macro_rules! from_str_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl EnvValue for $ty {
                fn parse_env(raw: &str) -> Result<Self, String> {
                    raw.trim().parse().map_err(|e| format!("{}", e))
                }

                fn render(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

from_str_value!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, char, IpAddr,
    Ipv4Addr, Ipv6Addr, SocketAddr,
);

impl EnvValue for String {
    fn parse_env(raw: &str) -> Result<Self, String> {
        Ok(raw.to_string())
    }

    fn render(&self) -> String {
        self.clone()
    }
}

impl EnvValue for PathBuf {
    fn parse_env(raw: &str) -> Result<Self, String> {
        Ok(PathBuf::from(raw))
    }

    fn render(&self) -> String {
        self.display().to_string()
    }
}

impl EnvValue for bool {
    fn parse_env(raw: &str) -> Result<Self, String> {
        match raw.trim() {
            "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
            "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
            other => Err(format!("'{}' is not a boolean", other)),
        }
    }

    fn render(&self) -> String {
        self.to_string()
    }
}

impl EnvValue for Duration {
    fn parse_env(raw: &str) -> Result<Self, String> {
        humantime::parse_duration(raw.trim()).map_err(|e| e.to_string())
    }

    fn render(&self) -> String {
        humantime::format_duration(*self).to_string()
    }
}

impl<T: EnvValue> EnvValue for Option<T> {
    fn parse_env(raw: &str) -> Result<Self, String> {
        T::parse_env(raw).map(Some)
    }

    fn render(&self) -> String {
        match self {
            Some(value) => value.render(),
            None => String::new(),
        }
    }
}

impl<T: EnvValue> EnvValue for Vec<T> {
    fn parse_env(raw: &str) -> Result<Self, String> {
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        raw.split(',').map(T::parse_env).collect()
    }

    fn render(&self) -> String {
        self.iter()
            .map(EnvValue::render)
            .collect::<Vec<_>>()
            .join(",")
    }
}
