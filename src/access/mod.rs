//! Role-based access checks and menu filtering.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Access levels, ordered from least to most privileged.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum AccessRole {
    Ban,
    NotLogin,
    User,
    Admin,
}

impl fmt::Display for AccessRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AccessRole::Ban => "ban",
            AccessRole::NotLogin => "notLogin",
            AccessRole::User => "user",
            AccessRole::Admin => "admin",
        };
        f.write_str(name)
    }
}

/// The user a view acts on behalf of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    id: Option<String>,
    name: String,
    role: AccessRole,
}

impl CurrentUser {
    pub fn new(id: impl Into<String>, name: Option<String>, role: AccessRole) -> Self {
        let id = id.into();
        Self {
            name: name.unwrap_or_else(|| id.clone()),
            id: Some(id),
            role,
        }
    }

    /// Sentinel for an anonymous visitor.
    pub fn not_logged_in() -> Self {
        Self {
            id: None,
            name: "未登录".to_string(),
            role: AccessRole::NotLogin,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> AccessRole {
        self.role
    }

    pub fn is_logged_in(&self) -> bool {
        self.id.is_some() && self.role != AccessRole::NotLogin
    }
}

impl Default for CurrentUser {
    fn default() -> Self {
        Self::not_logged_in()
    }
}

/// Whether `user` may see something that requires `needed`.
///
/// Banned users are treated as anonymous.
pub fn check_access(user: &CurrentUser, needed: AccessRole) -> bool {
    let effective = if user.is_logged_in() && user.role != AccessRole::Ban {
        user.role
    } else {
        AccessRole::NotLogin
    };

    match needed {
        AccessRole::Ban | AccessRole::NotLogin => true,
        AccessRole::User => effective != AccessRole::NotLogin,
        AccessRole::Admin => effective == AccessRole::Admin,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MenuItem {
    pub name: String,
    pub path: String,
    #[serde(default = "default_menu_access")]
    pub access: AccessRole,
    #[serde(default)]
    pub children: Vec<MenuItem>,
}

fn default_menu_access() -> AccessRole {
    AccessRole::NotLogin
}

impl MenuItem {
    pub fn new(name: impl Into<String>, path: impl Into<String>, access: AccessRole) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            access,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<MenuItem>) -> Self {
        self.children = children;
        self
    }
}

/// Keeps the menu items `user` may see, filtering nested children the same way.
pub fn accessible_menus(user: &CurrentUser, items: &[MenuItem]) -> Vec<MenuItem> {
    items
        .iter()
        .filter(|item| check_access(user, item.access))
        .map(|item| MenuItem {
            children: accessible_menus(user, &item.children),
            ..item.clone()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: AccessRole) -> CurrentUser {
        CurrentUser::new("1001", Some("tester".to_string()), role)
    }

    #[test]
    fn test_check_access_matrix() {
        let anonymous = CurrentUser::not_logged_in();
        let regular = user(AccessRole::User);
        let admin = user(AccessRole::Admin);
        let banned = user(AccessRole::Ban);

        assert!(check_access(&anonymous, AccessRole::NotLogin));
        assert!(!check_access(&anonymous, AccessRole::User));
        assert!(!check_access(&anonymous, AccessRole::Admin));

        assert!(check_access(&regular, AccessRole::User));
        assert!(!check_access(&regular, AccessRole::Admin));

        assert!(check_access(&admin, AccessRole::User));
        assert!(check_access(&admin, AccessRole::Admin));

        assert!(check_access(&banned, AccessRole::NotLogin));
        assert!(!check_access(&banned, AccessRole::User));
    }

    #[test]
    fn test_not_logged_in_sentinel() {
        let anonymous = CurrentUser::default();

        assert!(!anonymous.is_logged_in());
        assert_eq!(anonymous.id(), None);
        assert_eq!(anonymous.name(), "未登录");
        assert_eq!(anonymous.role(), AccessRole::NotLogin);
    }

    #[test]
    fn test_accessible_menus_filters_nested_items() {
        let menus = vec![
            MenuItem::new("主页", "/", AccessRole::NotLogin),
            MenuItem::new("题库", "/banks", AccessRole::NotLogin),
            MenuItem::new("模拟面试", "/mockInterview", AccessRole::User),
            MenuItem::new("管理", "/admin", AccessRole::Admin).with_children(vec![
                MenuItem::new("用户管理", "/admin/user", AccessRole::Admin),
            ]),
            MenuItem::new("个人中心", "/user", AccessRole::User).with_children(vec![
                MenuItem::new("面试记录", "/user/center", AccessRole::User),
                MenuItem::new("审核", "/user/review", AccessRole::Admin),
            ]),
        ];

        let anonymous: Vec<_> = accessible_menus(&CurrentUser::not_logged_in(), &menus)
            .into_iter()
            .map(|m| m.path)
            .collect();
        assert_eq!(anonymous, vec!["/", "/banks"]);

        let visible = accessible_menus(&user(AccessRole::User), &menus);
        let paths: Vec<_> = visible.iter().map(|m| m.path.as_str()).collect();
        assert_eq!(paths, vec!["/", "/banks", "/mockInterview", "/user"]);
        assert_eq!(visible[3].children.len(), 1);
        assert_eq!(visible[3].children[0].path, "/user/center");

        let admin = accessible_menus(&user(AccessRole::Admin), &menus);
        assert_eq!(admin.len(), 5);
        assert_eq!(admin[4].children.len(), 2);
    }

    #[test]
    fn test_role_wire_names() {
        let role: AccessRole = serde_json::from_str("\"notLogin\"").unwrap();
        assert_eq!(role, AccessRole::NotLogin);
        assert_eq!(serde_json::to_string(&AccessRole::Admin).unwrap(), "\"admin\"");
        assert_eq!(AccessRole::User.to_string(), "user");
    }
}
