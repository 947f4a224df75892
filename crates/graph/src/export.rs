use crate::error::Result;
use crate::graph::Graph;
use petgraph::dot::{Config, Dot};
use std::fs;
use std::path::Path;

impl<T> Graph<T> {
    /// Human readable listing: one line per vertex with its incoming count
    /// and outgoing targets, in insertion order.
    #[must_use]
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for vertex in self.vertices() {
            let targets: Vec<&str> = vertex.adjacent().iter().map(|v| v.key()).collect();
            out.push_str(&format!(
                "{} (in: {}) -> [{}]\n",
                vertex.key(),
                vertex.incoming_count(),
                targets.join(", ")
            ));
        }
        out
    }

    /// Graphviz rendering labelled by vertex key.
    #[must_use]
    pub fn to_dot(&self) -> String {
        let labelled = self.graph.map(|_, node| node.key.as_str(), |_, _| "");
        format!("{}", Dot::with_config(&labelled, &[Config::EdgeNoLabel]))
    }

    pub fn export_dot(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_dot())?;
        self.logger()
            .info(format_args!("graph exported to {}", path.display()));
        Ok(())
    }
}
