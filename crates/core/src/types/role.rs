//! User roles and product categories.

use serde::{Deserialize, Serialize};

/// User role with different permission levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Buys products: owns carts and writes reviews.
    Customer,
    /// Manages the product catalog and stock.
    Manager,
    /// Full access, including user management.
    Admin,
}

impl Role {
    /// Returns the role name as stored and serialized.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "Customer",
            Self::Manager => "Manager",
            Self::Admin => "Admin",
        }
    }

    /// Managers and admins may manage the catalog and see every cart.
    #[must_use]
    pub const fn is_staff(&self) -> bool {
        matches!(self, Self::Manager | Self::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Customer" => Ok(Self::Customer),
            "Manager" => Ok(Self::Manager),
            "Admin" => Ok(Self::Admin),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

/// Product category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Smartphone,
    Laptop,
    Appliance,
}

impl Category {
    /// Returns the category name as stored and serialized.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Smartphone => "Smartphone",
            Self::Laptop => "Laptop",
            Self::Appliance => "Appliance",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Smartphone" => Ok(Self::Smartphone),
            "Laptop" => Ok(Self::Laptop),
            "Appliance" => Ok(Self::Appliance),
            _ => Err(format!("invalid category: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_roundtrip_through_str() {
        for role in [Role::Customer, Role::Manager, Role::Admin] {
            assert_eq!(role.to_string().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn test_role_rejects_lowercase() {
        assert!("admin".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_is_staff() {
        assert!(!Role::Customer.is_staff());
        assert!(Role::Manager.is_staff());
        assert!(Role::Admin.is_staff());
    }

    #[test]
    fn test_role_serializes_capitalized() {
        assert_eq!(serde_json::to_string(&Role::Manager).unwrap(), "\"Manager\"");
    }

    #[test]
    fn test_category_parse() {
        assert_eq!("Laptop".parse::<Category>().unwrap(), Category::Laptop);
        assert!("Tablet".parse::<Category>().is_err());
    }

    #[test]
    fn test_category_serde() {
        let json = serde_json::to_string(&Category::Appliance).unwrap();
        assert_eq!(json, "\"Appliance\"");
        let parsed: Category = serde_json::from_str("\"Smartphone\"").unwrap();
        assert_eq!(parsed, Category::Smartphone);
    }
}
