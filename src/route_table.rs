use std::{
    cmp::Reverse,
    collections::{BTreeMap, HashSet},
    fmt,
};

use crate::{error::RouteTableError, guard::AccessRequirement};

/// Name of the route anonymous users are redirected to.
pub const LOGIN_ROUTE: &str = "login";

/// Path parameters captured by a match, keyed by parameter name.
pub type RouteParams = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
}

/// PathPattern
///
/// A parsed route path such as `/files/:filePath`. Segments starting with `:` are named
/// parameters that capture exactly one non-empty path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Result<Self, RouteTableError> {
        let invalid = |reason: &str| RouteTableError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        };

        let rest = pattern
            .strip_prefix('/')
            .ok_or_else(|| invalid("must start with `/`"))?;
        let rest = rest.trim_end_matches('/');

        let mut segments = Vec::new();
        let mut seen = HashSet::new();
        if !rest.is_empty() {
            for part in rest.split('/') {
                if part.is_empty() {
                    return Err(invalid("empty segment"));
                }
                match part.strip_prefix(':') {
                    Some("") => return Err(invalid("parameter without a name")),
                    Some(name) => {
                        if !seen.insert(name) {
                            return Err(invalid(&format!("parameter `{name}` repeated")));
                        }
                        segments.push(Segment::Param(name.to_string()));
                    }
                    None => segments.push(Segment::Static(part.to_string())),
                }
            }
        }

        Ok(Self {
            raw: pattern.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// True for the pattern of the root route (`/`).
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Param(name) => Some(name.as_str()),
            Segment::Static(_) => None,
        })
    }

    /// Canonical form used to detect two patterns that match the same paths
    /// (`/files/:a` and `/FILES/:b` are the same route shape).
    fn shape(&self) -> String {
        let parts: Vec<String> = self
            .segments
            .iter()
            .map(|segment| match segment {
                Segment::Static(value) => value.to_ascii_lowercase(),
                Segment::Param(_) => ":".to_string(),
            })
            .collect();
        format!("/{}", parts.join("/"))
    }

    /// One flag per segment, set for static segments. Compared lexicographically so that a
    /// static segment outranks a parameter at the first position where two patterns differ.
    fn specificity(&self) -> Vec<bool> {
        self.segments
            .iter()
            .map(|segment| matches!(segment, Segment::Static(_)))
            .collect()
    }

    /// matches
    ///
    /// Matches a concrete path (no query string) against the pattern. Static segments compare
    /// ASCII case-insensitively, trailing slashes are ignored, and captured values are
    /// percent-decoded with their case preserved.
    pub fn matches(&self, path: &str) -> Option<RouteParams> {
        let rest = path.strip_prefix('/')?.trim_end_matches('/');
        let parts: Vec<&str> = if rest.is_empty() {
            Vec::new()
        } else {
            rest.split('/').collect()
        };
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = RouteParams::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            if part.is_empty() {
                return None;
            }
            let decoded = decode_segment(part);
            match segment {
                Segment::Static(expected) => {
                    if !expected.eq_ignore_ascii_case(&decoded) {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    params.insert(name.clone(), decoded);
                }
            }
        }
        Some(params)
    }

    /// href
    ///
    /// Builds a concrete path from the pattern, percent-encoding parameter values.
    pub fn href(&self, params: &RouteParams) -> Result<String, RouteTableError> {
        let mut path = String::new();
        for segment in &self.segments {
            path.push('/');
            match segment {
                Segment::Static(value) => path.push_str(value),
                Segment::Param(name) => {
                    let value = params
                        .get(name)
                        .ok_or_else(|| RouteTableError::MissingParam {
                            pattern: self.raw.clone(),
                            param: name.clone(),
                        })?;
                    path.push_str(&urlencoding::encode(value));
                }
            }
        }
        if path.is_empty() {
            path.push('/');
        }
        Ok(path)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

// Malformed escapes are left as-is; the view layer owns parameter validation.
fn decode_segment(part: &str) -> String {
    urlencoding::decode(part)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| part.to_string())
}

/// RouteEntry
///
/// One row of the route table: a named, path-pattern-associated navigation target bound to a view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    pub name: String,
    pub path: PathPattern,
    /// Identifier of the view component the rendering layer mounts for this route.
    pub view: String,
    pub access: AccessRequirement,
    /// When set, path parameters are handed to the view as props.
    pub props: bool,
}

/// RouteDef
///
/// Unvalidated declaration of a route, fed to `RouteTableBuilder`.
#[derive(Debug, Clone)]
pub struct RouteDef {
    pub name: String,
    pub path: String,
    pub view: String,
    pub access: AccessRequirement,
    pub props: bool,
}

impl RouteDef {
    pub fn new(name: impl Into<String>, path: impl Into<String>, view: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            view: view.into(),
            access: AccessRequirement::None,
            props: false,
        }
    }

    pub fn access(mut self, access: AccessRequirement) -> Self {
        self.access = access;
        self
    }

    pub fn props(mut self, props: bool) -> Self {
        self.props = props;
        self
    }
}

/// RouteMatch
///
/// A route entry together with the parameters captured from the requested path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    pub entry: &'a RouteEntry,
    pub params: RouteParams,
}

#[derive(Debug, Default)]
pub struct RouteTableBuilder {
    defs: Vec<RouteDef>,
}

impl RouteTableBuilder {
    pub fn route(mut self, def: RouteDef) -> Self {
        self.defs.push(def);
        self
    }

    /// build
    ///
    /// Parses every pattern and enforces the table invariants: unique names, unique path shapes,
    /// a root route, and a parameter-free `login` route whenever any route requires authentication.
    pub fn build(self) -> Result<RouteTable, RouteTableError> {
        let mut entries: Vec<RouteEntry> = Vec::with_capacity(self.defs.len());
        let mut names = HashSet::new();
        let mut shapes = HashSet::new();

        for def in self.defs {
            let path = PathPattern::parse(&def.path)?;
            if !names.insert(def.name.clone()) {
                return Err(RouteTableError::DuplicateName(def.name));
            }
            if !shapes.insert(path.shape()) {
                return Err(RouteTableError::DuplicatePath(def.path));
            }
            entries.push(RouteEntry {
                name: def.name,
                path,
                view: def.view,
                access: def.access,
                props: def.props,
            });
        }

        let root = entries
            .iter()
            .position(|entry| entry.path.is_root())
            .ok_or(RouteTableError::MissingRootRoute)?;

        let login = entries.iter().position(|entry| entry.name == LOGIN_ROUTE);
        if let Some(index) = login {
            if entries[index].path.param_names().next().is_some() {
                return Err(RouteTableError::ParameterizedRedirectTarget(
                    LOGIN_ROUTE.to_string(),
                ));
            }
        } else if entries
            .iter()
            .any(|entry| entry.access == AccessRequirement::RequiresAuth)
        {
            return Err(RouteTableError::MissingLoginRoute(LOGIN_ROUTE.to_string()));
        }

        Ok(RouteTable {
            entries,
            root,
            login,
        })
    }
}

/// RouteTable
///
/// The static, validated route table. Built once at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
    root: usize,
    login: Option<usize>,
}

impl RouteTable {
    pub fn builder() -> RouteTableBuilder {
        RouteTableBuilder::default()
    }

    /// application
    ///
    /// The route table of the document explorer front end: home, the protected file browser and
    /// PDF viewer, and the guest-only registration and login screens.
    pub fn application() -> Result<Self, RouteTableError> {
        Self::builder()
            .route(RouteDef::new("main", "/", "HomeView"))
            .route(
                RouteDef::new("files", "/files", "FilesView")
                    .access(AccessRequirement::RequiresAuth),
            )
            .route(
                RouteDef::new("pdf-explorer", "/files/:filePath", "PdfView")
                    .access(AccessRequirement::RequiresAuth)
                    .props(true),
            )
            .route(
                RouteDef::new("register", "/register", "RegistrationView")
                    .access(AccessRequirement::RequiresGuest),
            )
            .route(
                RouteDef::new(LOGIN_ROUTE, "/login", "LoginView")
                    .access(AccessRequirement::RequiresGuest),
            )
            .build()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RouteEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn by_name(&self, name: &str) -> Option<&RouteEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    pub fn root(&self) -> &RouteEntry {
        &self.entries[self.root]
    }

    pub fn login(&self) -> Option<&RouteEntry> {
        self.login.map(|index| &self.entries[index])
    }

    /// match_path
    ///
    /// Finds the entry for a concrete path. When several patterns match, the most specific one
    /// wins; ties go to the entry declared first.
    pub fn match_path(&self, path: &str) -> Option<RouteMatch<'_>> {
        self.entries
            .iter()
            .filter_map(|entry| entry.path.matches(path).map(|params| RouteMatch { entry, params }))
            .min_by_key(|candidate| Reverse(candidate.entry.path.specificity()))
    }
}
