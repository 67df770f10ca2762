//! Path classification against the fixed route-category tables.
//!
//! A path is tested against every category independently. Categories may overlap, so the
//! result is five booleans rather than a single tag; precedence between them is decided
//! by the rule list, never here.

/// RouteCategory
///
/// The closed set of route categories the gate knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteCategory {
    /// Sign in / sign up / recovery pages.
    Auth,
    /// Reachable regardless of authentication state.
    Public,
    /// Requires a session.
    Protected,
    /// Requires a session and the parent flag.
    ParentOnly,
    /// Requires a session and the admin check.
    Admin,
}

impl RouteCategory {
    pub const ALL: [RouteCategory; 5] = [
        RouteCategory::Auth,
        RouteCategory::Public,
        RouteCategory::Protected,
        RouteCategory::ParentOnly,
        RouteCategory::Admin,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RouteCategory::Auth => "auth",
            RouteCategory::Public => "public",
            RouteCategory::Protected => "protected",
            RouteCategory::ParentOnly => "parentOnly",
            RouteCategory::Admin => "admin",
        }
    }
}

const PUBLIC_ROUTES: &[&str] = &[
    "/",
    "/auth/signin",
    "/auth/signup",
    "/auth/error",
    "/auth/verify-request",
    "/about",
    "/contact",
    "/terms",
    "/privacy",
];

const AUTH_ROUTES: &[&str] = &[
    "/auth/signin",
    "/auth/signup",
    "/auth/error",
    "/auth/verify-request",
];

const PROTECTED_ROUTES: &[&str] = &[
    "/dashboard",
    "/profile",
    "/communities",
    "/books",
    "/messages",
    "/settings",
];

const PARENT_ONLY_ROUTES: &[&str] = &["/children", "/parent-dashboard"];

const ADMIN_ROUTES: &[&str] = &["/admin"];

/// matches_prefix
///
/// A path matches a table entry iff it equals the entry or continues it at a segment
/// boundary: `/books` and `/books/42` match `/books`, `/books2` does not.
pub fn matches_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// RouteTable
///
/// One prefix list per category. The application uses `RouteTable::BOOK_LENDING`; tables are
/// compiled in and cannot be configured at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteTable {
    auth: &'static [&'static str],
    public: &'static [&'static str],
    protected: &'static [&'static str],
    parent_only: &'static [&'static str],
    admin: &'static [&'static str],
}

impl RouteTable {
    pub const BOOK_LENDING: RouteTable = RouteTable {
        auth: AUTH_ROUTES,
        public: PUBLIC_ROUTES,
        protected: PROTECTED_ROUTES,
        parent_only: PARENT_ONLY_ROUTES,
        admin: ADMIN_ROUTES,
    };

    /// Builds an arbitrary table. Test-only: production code has exactly one table.
    #[cfg(test)]
    pub(crate) const fn from_entries(
        auth: &'static [&'static str],
        public: &'static [&'static str],
        protected: &'static [&'static str],
        parent_only: &'static [&'static str],
        admin: &'static [&'static str],
    ) -> Self {
        Self {
            auth,
            public,
            protected,
            parent_only,
            admin,
        }
    }

    pub fn entries(&self, category: RouteCategory) -> &'static [&'static str] {
        match category {
            RouteCategory::Auth => self.auth,
            RouteCategory::Public => self.public,
            RouteCategory::Protected => self.protected,
            RouteCategory::ParentOnly => self.parent_only,
            RouteCategory::Admin => self.admin,
        }
    }

    pub fn contains(&self, category: RouteCategory, path: &str) -> bool {
        self.entries(category)
            .iter()
            .any(|prefix| matches_prefix(path, prefix))
    }

    /// Tests `path` against every category.
    pub fn classify(&self, path: &str) -> Classification {
        Classification {
            auth: self.contains(RouteCategory::Auth, path),
            public: self.contains(RouteCategory::Public, path),
            protected: self.contains(RouteCategory::Protected, path),
            parent_only: self.contains(RouteCategory::ParentOnly, path),
            admin: self.contains(RouteCategory::Admin, path),
        }
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::BOOK_LENDING
    }
}

/// Classification
///
/// Independent membership flags for one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Classification {
    pub auth: bool,
    pub public: bool,
    pub protected: bool,
    pub parent_only: bool,
    pub admin: bool,
}

impl Classification {
    pub fn contains(&self, category: RouteCategory) -> bool {
        match category {
            RouteCategory::Auth => self.auth,
            RouteCategory::Public => self.public,
            RouteCategory::Protected => self.protected,
            RouteCategory::ParentOnly => self.parent_only,
            RouteCategory::Admin => self.admin,
        }
    }

    /// In any of the tables that require a session.
    pub fn is_gated(&self) -> bool {
        self.protected || self.parent_only || self.admin
    }

    /// In no table at all.
    pub fn is_unlisted(&self) -> bool {
        !RouteCategory::ALL.iter().any(|c| self.contains(*c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_matches_exact_and_nested_paths() {
        assert!(matches_prefix("/books", "/books"));
        assert!(matches_prefix("/books/42", "/books"));
        assert!(matches_prefix("/books/42/reviews", "/books"));
    }

    #[test]
    fn test_prefix_rejects_segment_near_misses() {
        assert!(!matches_prefix("/books2", "/books"));
        assert!(!matches_prefix("/bookshelf", "/books"));
        assert!(!matches_prefix("/book", "/books"));
        assert!(!matches_prefix("/my/books", "/books"));
    }

    #[test]
    fn test_root_entry_only_matches_root() {
        // "/" + "/" is "//", so only the bare root and double-slash paths match.
        assert!(matches_prefix("/", "/"));
        assert!(matches_prefix("//x", "/"));
        assert!(!matches_prefix("/about-us", "/"));
        assert!(!RouteTable::BOOK_LENDING.classify("/books2").public);
    }

    #[test]
    fn test_entries_are_normalized() {
        let table = RouteTable::BOOK_LENDING;
        for category in RouteCategory::ALL {
            for entry in table.entries(category) {
                assert!(entry.starts_with('/'), "{entry} must be absolute");
                assert!(
                    *entry == "/" || !entry.ends_with('/'),
                    "{entry} must not end with a slash"
                );
            }
        }
    }

    #[test]
    fn test_auth_routes_are_also_public() {
        let table = RouteTable::BOOK_LENDING;
        for entry in table.entries(RouteCategory::Auth) {
            let class = table.classify(entry);
            assert!(class.auth && class.public, "{entry}");
        }
    }

    #[test]
    fn test_classification_flags_are_independent() {
        let table = RouteTable::BOOK_LENDING;

        let children = table.classify("/children/7");
        assert!(children.parent_only);
        assert!(children.is_gated());
        assert!(!children.protected && !children.admin && !children.public);

        let admin = table.classify("/admin/users");
        assert!(admin.admin && admin.is_gated());

        assert!(table.classify("/books2").is_unlisted());
        assert!(!table.classify("/").is_unlisted());
    }
}
