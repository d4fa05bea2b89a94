//! Navigation tree and route table construction.
//!
//! [`PageMap::build`] walks a [`CategorySpec`] against the enumerated document
//! set and produces the navigation tree shown to readers plus the
//! [`RouteTable`] used to resolve requests.
//!
//! Navigation never points at a document that does not exist: category entries
//! whose path is missing are pruned, and folders left without any resolved
//! descendant are pruned with them. Every enumerated document stays
//! reachable through a fallback key derived from its own path.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use docmap_config::{CategoryItem, CategorySpec};
use docmap_storage::DocumentPath;
use serde::Serialize;

use crate::resolver::{self, Resolution};
use crate::route::{join, natural_key, normalize_route, segment, title_case, title_from_path};
use crate::route_table::{RouteSource, RouteTable};

/// Node of the navigation tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NavigationNode {
    /// Group of pages and folders sharing a route prefix.
    Folder {
        /// Display name.
        name: String,
        /// Route prefix of every descendant.
        route: String,
        /// Children in display order.
        children: Vec<NavigationNode>,
        /// Initially expanded hint.
        #[serde(rename = "defaultOpen", skip_serializing_if = "Option::is_none")]
        default_open: Option<bool>,
    },
    /// Link to one document.
    Page {
        /// Display name.
        name: String,
        /// Route key, unique within the tree.
        route: String,
        /// Top-level group slug, for ordering only.
        #[serde(skip_serializing_if = "Option::is_none")]
        group: Option<String>,
    },
    /// Display order and labels of the sibling folders that follow.
    GroupMeta {
        /// Folder slug to label, in display order.
        entries: Vec<GroupEntry>,
    },
}

impl NavigationNode {
    /// Route of a folder or page.
    pub fn route(&self) -> Option<&str> {
        match self {
            Self::Folder { route, .. } | Self::Page { route, .. } => Some(route),
            Self::GroupMeta { .. } => None,
        }
    }
}

/// Entry of a [`NavigationNode::GroupMeta`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GroupEntry {
    /// Folder slug.
    pub name: String,
    /// Display label.
    pub label: String,
}

/// Folder on the path from the tree root to a page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Breadcrumb {
    /// Folder name.
    pub name: String,
    /// Folder route.
    pub route: String,
}

/// Why a category entry was left out of the navigation tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "kebab-case")]
pub enum PruneReason {
    /// Path is not a valid document path.
    InvalidPath,
    /// Document is not present in the origin.
    Missing,
    /// Another page already uses the route.
    DuplicateRoute {
        /// The contested route.
        route: String,
    },
    /// Folder had no resolvable descendant.
    EmptyFolder,
    /// Title yields no route segment of its own.
    UnroutableTitle,
}

/// Category entry dropped during a build.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PrunedEntry {
    /// Path or folder title as written in the categories.
    pub entry: String,
    /// Why it was dropped.
    #[serde(flatten)]
    pub reason: PruneReason,
}

/// Options for [`PageMap::build`].
#[derive(Clone, Debug, Default)]
pub struct BuildOptions {
    /// Top-level folder whose documents are reachable only through aliases
    /// with this prefix stripped.
    pub hidden_root: Option<String>,
}

/// Navigation tree plus route table for one project.
#[derive(Clone, Debug, Default, Serialize)]
pub struct PageMap {
    tree: Vec<NavigationNode>,
    routes: RouteTable,
    #[serde(skip)]
    documents: BTreeSet<DocumentPath>,
    pruned: Vec<PrunedEntry>,
}

impl PageMap {
    /// Build the page map for an enumerated document set.
    ///
    /// Pure function of its inputs. With no categories the tree mirrors the
    /// directory layout instead.
    pub fn build(
        paths: impl IntoIterator<Item = DocumentPath>,
        spec: &CategorySpec,
        options: &BuildOptions,
    ) -> Self {
        let documents: BTreeSet<DocumentPath> = paths.into_iter().collect();
        let hidden_root = options
            .hidden_root
            .as_deref()
            .map(|h| h.trim_matches('/'))
            .filter(|h| !h.is_empty());

        let mut builder = Builder {
            documents: &documents,
            routes: RouteTable::default(),
            page_routes: HashSet::new(),
            referenced: HashSet::new(),
            pruned: Vec::new(),
        };

        let curated = builder.groups(spec);
        builder.fallbacks(hidden_root);

        let tree = if spec.is_empty() {
            natural_tree(&documents, &builder.routes, hidden_root)
        } else {
            curated
        };

        tracing::debug!(
            documents = documents.len(),
            routes = builder.routes.len(),
            pruned = builder.pruned.len(),
            "Built page map"
        );

        Self {
            tree,
            routes: builder.routes,
            pruned: builder.pruned,
            documents,
        }
    }

    /// Navigation tree.
    pub fn tree(&self) -> &[NavigationNode] {
        &self.tree
    }

    /// Consume into the navigation tree.
    pub fn into_tree(self) -> Vec<NavigationNode> {
        self.tree
    }

    /// Route table.
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Enumerated documents, sorted.
    pub fn documents(&self) -> &BTreeSet<DocumentPath> {
        &self.documents
    }

    /// Category entries left out of the tree.
    pub fn pruned(&self) -> &[PrunedEntry] {
        &self.pruned
    }

    /// Resolve request path segments to a document.
    pub fn resolve<S: AsRef<str>>(&self, segments: &[S]) -> Resolution {
        resolver::resolve(self, segments)
    }

    /// Folders leading to the page with `route`, outermost first.
    ///
    /// Empty if no page in the tree has that route.
    pub fn breadcrumbs(&self, route: &str) -> Vec<Breadcrumb> {
        let route = normalize_route(route);
        let mut trail = Vec::new();
        if find_page(&self.tree, &route, &mut trail) {
            trail
        } else {
            Vec::new()
        }
    }
}

fn find_page(nodes: &[NavigationNode], route: &str, trail: &mut Vec<Breadcrumb>) -> bool {
    for node in nodes {
        match node {
            NavigationNode::Page { route: r, .. } if r == route => return true,
            NavigationNode::Folder {
                name,
                route: r,
                children,
                ..
            } => {
                trail.push(Breadcrumb {
                    name: name.clone(),
                    route: r.clone(),
                });
                if find_page(children, route, trail) {
                    return true;
                }
                trail.pop();
            }
            _ => {}
        }
    }
    false
}

struct Builder<'a> {
    documents: &'a BTreeSet<DocumentPath>,
    routes: RouteTable,
    page_routes: HashSet<String>,
    referenced: HashSet<DocumentPath>,
    pruned: Vec<PrunedEntry>,
}

impl Builder<'_> {
    fn groups(&mut self, spec: &CategorySpec) -> Vec<NavigationNode> {
        let mut entries = Vec::new();
        let mut folders = Vec::new();

        for group in &spec.groups {
            let Some(slug) = segment(&group.title) else {
                self.prune(&group.title, PruneReason::UnroutableTitle);
                continue;
            };
            let children = self.items(&group.items, &slug, &slug);
            if children.is_empty() {
                self.prune(&group.title, PruneReason::EmptyFolder);
                continue;
            }
            let folder = NavigationNode::Folder {
                name: group.title.clone(),
                route: slug.clone(),
                children,
                default_open: group.open,
            };
            if push_node(&mut folders, folder) {
                entries.push(GroupEntry {
                    name: slug,
                    label: group.title.clone(),
                });
            }
        }

        if folders.is_empty() {
            return folders;
        }
        let mut tree = Vec::with_capacity(folders.len() + 1);
        tree.push(NavigationNode::GroupMeta { entries });
        tree.extend(folders);
        tree
    }

    fn items(&mut self, items: &[CategoryItem], parent: &str, group: &str) -> Vec<NavigationNode> {
        let mut nodes = Vec::new();
        for item in items {
            let node = match item {
                CategoryItem::Path(raw) => self
                    .document(raw)
                    .and_then(|path| self.page(title_from_path(&path), parent, path, group)),
                CategoryItem::Titled { title, path } => self
                    .document(path)
                    .and_then(|path| self.page(title.clone(), parent, path, group)),
                CategoryItem::Nested {
                    title,
                    open,
                    children,
                } => {
                    let Some(slug) = segment(title) else {
                        self.prune(title, PruneReason::UnroutableTitle);
                        continue;
                    };
                    let route = join(parent, &slug);
                    let children = self.items(children, &route, group);
                    if children.is_empty() {
                        self.prune(title, PruneReason::EmptyFolder);
                        None
                    } else {
                        Some(NavigationNode::Folder {
                            name: title.clone(),
                            route,
                            children,
                            default_open: *open,
                        })
                    }
                }
            };
            if let Some(node) = node {
                push_node(&mut nodes, node);
            }
        }
        nodes
    }

    /// Look up a category path among the enumerated documents.
    fn document(&mut self, raw: &str) -> Option<DocumentPath> {
        let Some(path) = DocumentPath::parse(raw) else {
            self.prune(raw, PruneReason::InvalidPath);
            return None;
        };
        if self.documents.contains(&path) {
            Some(path)
        } else {
            self.prune(raw, PruneReason::Missing);
            None
        }
    }

    fn page(
        &mut self,
        name: String,
        parent: &str,
        path: DocumentPath,
        group: &str,
    ) -> Option<NavigationNode> {
        let Some(slug) = segment(&name)
            .or_else(|| segment(path.file_stem()))
            .or_else(|| segment(&title_from_path(&path)))
        else {
            self.prune(path.as_str(), PruneReason::UnroutableTitle);
            return None;
        };
        let route = join(parent, &slug);
        if !self.page_routes.insert(route.clone()) {
            self.prune(path.as_str(), PruneReason::DuplicateRoute { route });
            return None;
        }
        self.routes
            .insert(route.clone(), path.clone(), RouteSource::Curated);
        self.referenced.insert(path);
        Some(NavigationNode::Page {
            name,
            route,
            group: (!group.is_empty()).then(|| group.to_owned()),
        })
    }

    /// Natural keys for unreferenced documents, then hidden-root aliases.
    fn fallbacks(&mut self, hidden_root: Option<&str>) {
        let mut hidden = Vec::new();
        for path in self.documents {
            if self.referenced.contains(path) {
                continue;
            }
            if let Some(stripped) = hidden_root.and_then(|h| path.strip_prefix(h)) {
                hidden.push((stripped, path));
                continue;
            }
            self.routes
                .insert(natural_key(path), path.clone(), RouteSource::Fallback);
        }

        for (stripped, path) in hidden {
            let key = natural_key(&stripped);
            if self.routes.contains(&key) {
                tracing::debug!(path = %path, route = %key, "Hidden-root alias already taken");
                continue;
            }
            self.routes.insert(key, path.clone(), RouteSource::Alias);
        }
    }

    fn prune(&mut self, entry: &str, reason: PruneReason) {
        tracing::debug!(entry, reason = ?reason, "Pruned navigation entry");
        self.pruned.push(PrunedEntry {
            entry: entry.to_owned(),
            reason,
        });
    }
}

/// Append `node` to `siblings`, folding a folder into an earlier sibling
/// folder with the same route. Returns `true` if a new node was added.
fn push_node(siblings: &mut Vec<NavigationNode>, node: NavigationNode) -> bool {
    let same_route = siblings.iter().position(|sibling| {
        matches!(sibling, NavigationNode::Folder { .. })
            && matches!(node, NavigationNode::Folder { .. })
            && sibling.route() == node.route()
    });
    let Some(index) = same_route else {
        siblings.push(node);
        return true;
    };
    if let (
        NavigationNode::Folder { children, default_open, .. },
        NavigationNode::Folder {
            children: more,
            default_open: open,
            ..
        },
    ) = (&mut siblings[index], node)
    {
        children.extend(more);
        *default_open = default_open.or(open);
    }
    false
}

/// Directory listing used when no categories are configured.
#[derive(Default)]
struct Dir<'a> {
    files: Vec<&'a DocumentPath>,
    dirs: BTreeMap<&'a str, Dir<'a>>,
}

fn natural_tree(
    documents: &BTreeSet<DocumentPath>,
    routes: &RouteTable,
    hidden_root: Option<&str>,
) -> Vec<NavigationNode> {
    let mut root = Dir::default();
    for path in documents {
        if hidden_root.is_some_and(|h| path.strip_prefix(h).is_some()) {
            continue;
        }
        let mut dir = &mut root;
        let parent = path.parent();
        if !parent.is_empty() {
            for segment in parent.split('/') {
                dir = dir.dirs.entry(segment).or_default();
            }
        }
        dir.files.push(path);
    }
    dir_nodes(&root, "", routes)
}

fn dir_nodes(dir: &Dir<'_>, route: &str, routes: &RouteTable) -> Vec<NavigationNode> {
    let mut files = dir.files.clone();
    files.sort_by_key(|p| !p.is_index());

    let mut nodes: Vec<NavigationNode> = files
        .into_iter()
        .filter_map(|path| {
            let key = natural_key(path);
            (routes.get(&key) == Some(path)).then(|| NavigationNode::Page {
                name: title_from_path(path),
                route: key,
                group: None,
            })
        })
        .collect();

    for (name, child) in &dir.dirs {
        let child_route = join(route, name);
        let children = dir_nodes(child, &child_route, routes);
        if !children.is_empty() {
            nodes.push(NavigationNode::Folder {
                name: title_case(name),
                route: child_route,
                children,
                default_open: None,
            });
        }
    }
    nodes
}
