//! Authentication: the personnel directory, the legacy password digest and
//! session tokens.

pub mod directory;
pub mod jwt;
pub mod password;

use minutes_core::roles::Role;
use serde::Serialize;

/// An authenticated person: directory name fields plus the locally assigned role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub username: String,
    pub prefix: String,
    pub fname: String,
    pub lname: String,
    pub role: Role,
}

impl Identity {
    /// Name as shown in the client: `prefix + fname + " " + lname`.
    pub fn display_name(&self) -> String {
        format!("{}{} {}", self.prefix, self.fname, self.lname)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_joins_prefix_without_a_space() {
        let identity = Identity {
            username: "alice".into(),
            prefix: "นาง".into(),
            fname: "อลิส".into(),
            lname: "ใจดี".into(),
            role: Role::User,
        };
        assert_eq!(identity.display_name(), "นางอลิส ใจดี");
    }
}
