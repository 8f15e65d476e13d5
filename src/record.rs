use std::fmt;
use std::str::FromStr;

use derive_setters::Setters;

/// Unique, immutable identifier of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(pub u32);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    Admin,
    Manager,
    User,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Manager, Role::User];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Manager => "Manager",
            Role::User => "User",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "user" => Ok(Role::User),
            other => Err(format!("unknown role \"{other}\"")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Status {
    Active,
    Inactive,
}

impl Status {
    pub const ALL: [Status; 2] = [Status::Active, Status::Inactive];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Active => "Active",
            Status::Inactive => "Inactive",
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Status::Active => Status::Inactive,
            Status::Inactive => Status::Active,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Status::Active),
            "inactive" => Ok(Status::Inactive),
            other => Err(format!("unknown status \"{other}\"")),
        }
    }
}

/// One row of the data table.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: RecordId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub status: Status,
    /// ISO date (`YYYY-MM-DD`), so text order is chronological order.
    pub last_login: String,
    pub revenue: f64,
}

impl Record {
    /// Lowercased text the free-text search runs against.
    pub fn search_text(&self) -> String {
        format!("{} {} {}", self.name, self.email, self.role).to_lowercase()
    }
}

/// Revenue is a finite, non-negative amount.
pub fn is_valid_revenue(revenue: f64) -> bool {
    revenue.is_finite() && revenue >= 0.0
}

/// A record that has not been assigned an identifier yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    pub name: String,
    pub email: String,
    pub role: Role,
    pub status: Status,
    pub last_login: String,
    pub revenue: f64,
}

impl NewRecord {
    pub(crate) fn with_id(self, id: RecordId) -> Record {
        Record {
            id,
            name: self.name,
            email: self.email,
            role: self.role,
            status: self.status,
            last_login: self.last_login,
            revenue: self.revenue,
        }
    }
}

/// Partial update of a record. Unset fields are left untouched and the
/// identifier can never be changed.
#[derive(Debug, Clone, Default, PartialEq, Setters)]
#[setters(strip_option, into)]
pub struct RecordPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub status: Option<Status>,
    pub last_login: Option<String>,
    pub revenue: Option<f64>,
}

impl RecordPatch {
    pub fn apply(&self, record: &mut Record) {
        if let Some(name) = &self.name {
            record.name = name.clone();
        }
        if let Some(email) = &self.email {
            record.email = email.clone();
        }
        if let Some(role) = self.role {
            record.role = role;
        }
        if let Some(status) = self.status {
            record.status = status;
        }
        if let Some(last_login) = &self.last_login {
            record.last_login = last_login.clone();
        }
        if let Some(revenue) = self.revenue.filter(|r| is_valid_revenue(*r)) {
            record.revenue = revenue;
        }
    }
}
