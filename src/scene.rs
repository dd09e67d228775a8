//! TOML scene descriptions
//!
//! A scene lists leaf rectangles, cluster boundaries and exempt groups by
//! name. Participant ids are assigned in file order: leaves first, then
//! clusters, with each cluster taking two ids unless it is fixed.
//!
//! ```toml
//! [config]
//! min_separation = 0.001
//!
//! [[leaf]]
//! name = "a"
//! x = 0.0
//! y = 0.0
//! width = 10.0
//! height = 10.0
//!
//! [[cluster]]
//! name = "outer"
//! x = -20.0
//! y = -20.0
//! width = 60.0
//! height = 60.0
//! margin = { left = 2.0, right = 2.0, top = 2.0, bottom = 2.0 }
//!
//! [[exempt]]
//! members = ["a", "outer"]
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::overlap::{
    ClusterBoundary, Dim, ExemptionRegistry, GroupId, Margin, NonOverlapConstraints,
    OverlapConfig, ParticipantGeometry, PositionVariable, Rect, Variables,
};

/// Errors that can occur when loading or building a scene
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Failed to read scene file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse scene TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("participant name '{name}' is used more than once")]
    DuplicateName { name: String },
    #[error("exempt group {group} names unknown participant '{name}'")]
    UnknownParticipant { group: usize, name: String },
}

/// A leaf rectangle, given by its top-left corner and size
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LeafSpec {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub group: GroupId,
}

/// A cluster boundary, given by its bounds without margin
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClusterSpec {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub margin: Margin,
    #[serde(default)]
    pub group: GroupId,
    /// Derived from a fixed rectangle: no boundary variables
    #[serde(default)]
    pub fixed: bool,
}

/// Participants allowed to overlap each other
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExemptGroupSpec {
    pub members: Vec<String>,
}

/// Parsed scene file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scene {
    #[serde(default)]
    pub config: OverlapConfig,
    #[serde(default, rename = "leaf")]
    pub leaves: Vec<LeafSpec>,
    #[serde(default, rename = "cluster")]
    pub clusters: Vec<ClusterSpec>,
    #[serde(default, rename = "exempt")]
    pub exempt_groups: Vec<ExemptGroupSpec>,
}

impl Scene {
    /// Load a scene from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, SceneError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load a scene from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, SceneError> {
        Ok(toml::from_str(content)?)
    }

    /// Assign ids, create the variables and resolve exempt groups
    pub fn layout(&self) -> Result<SceneLayout, SceneError> {
        let mut vars = Variables::new();
        let mut participants = Vec::with_capacity(self.leaves.len() + self.clusters.len());
        let mut ids: HashMap<&str, usize> = HashMap::new();

        for leaf in &self.leaves {
            let id = vars.push_point(leaf.x + leaf.width / 2.0, leaf.y + leaf.height / 2.0);
            if ids.insert(leaf.name.as_str(), id).is_some() {
                return Err(SceneError::DuplicateName {
                    name: leaf.name.clone(),
                });
            }
            participants.push(SceneParticipant {
                name: leaf.name.clone(),
                geometry: ParticipantGeometry::leaf(
                    id,
                    leaf.width / 2.0,
                    leaf.height / 2.0,
                    leaf.group,
                ),
                cluster: None,
            });
        }

        for cluster in &self.clusters {
            let bounds = Rect::new(cluster.x, cluster.y, cluster.width, cluster.height);
            let boundary = if cluster.fixed {
                let id = vars.push_point(
                    bounds.center(Dim::Horizontal),
                    bounds.center(Dim::Vertical),
                );
                ClusterBoundary::fixed(id, bounds, cluster.margin)
            } else {
                let id = vars.push(
                    PositionVariable::at(bounds.x),
                    PositionVariable::at(bounds.y),
                );
                vars.push_point(bounds.x + bounds.width, bounds.y + bounds.height);
                ClusterBoundary::new(id, cluster.margin)
            };
            if ids.insert(cluster.name.as_str(), boundary.var_id).is_some() {
                return Err(SceneError::DuplicateName {
                    name: cluster.name.clone(),
                });
            }
            participants.push(SceneParticipant {
                name: cluster.name.clone(),
                geometry: ParticipantGeometry::cluster(&boundary, cluster.group),
                cluster: Some(boundary),
            });
        }

        let mut exemptions = ExemptionRegistry::new();
        for (group, spec) in self.exempt_groups.iter().enumerate() {
            let members = spec
                .members
                .iter()
                .map(|name| {
                    ids.get(name.as_str())
                        .copied()
                        .ok_or_else(|| SceneError::UnknownParticipant {
                            group,
                            name: name.clone(),
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;
            exemptions.declare_exempt_group(members);
        }

        Ok(SceneLayout {
            vars,
            exemptions,
            participants,
        })
    }
}

/// A named participant with its assigned geometry
#[derive(Debug, Clone, PartialEq)]
pub struct SceneParticipant {
    pub name: String,
    pub geometry: ParticipantGeometry,
    pub cluster: Option<ClusterBoundary>,
}

impl SceneParticipant {
    pub fn id(&self) -> usize {
        self.geometry.id
    }

    /// Register with a generator as a leaf or a cluster
    pub fn register(&self, generator: &mut NonOverlapConstraints<'_>) {
        let g = &self.geometry;
        match &self.cluster {
            Some(boundary) => generator.register_cluster(boundary, g.group),
            None => generator.register_leaf(
                g.id,
                g.half_dim(Dim::Horizontal),
                g.half_dim(Dim::Vertical),
                g.group,
            ),
        }
    }

    /// Rectangle without cluster margin, from final positions
    pub fn bounds(&self, vars: &Variables) -> Rect {
        let g = &self.geometry;
        let margin = g.margin();
        let padded = g.current_rect(vars);
        Rect::new(
            padded.x + margin.left,
            padded.y + margin.top,
            padded.width - margin.left - margin.right,
            padded.height - margin.top - margin.bottom,
        )
    }
}

/// A scene with ids assigned and variables created
#[derive(Debug, Clone)]
pub struct SceneLayout {
    pub vars: Variables,
    pub exemptions: ExemptionRegistry,
    pub participants: Vec<SceneParticipant>,
}

impl SceneLayout {
    /// Bounding boxes indexed by participant id, as expected by the
    /// one-shot emission pass
    pub fn bounding_boxes(participants: &[SceneParticipant], vars: &Variables) -> Vec<Rect> {
        let mut boxes = vec![Rect::default(); vars.len()];
        for participant in participants {
            boxes[participant.id()] = participant.bounds(vars);
        }
        boxes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENE: &str = r#"
[config]
min_separation = 0.25

[[leaf]]
name = "a"
x = 0.0
y = 0.0
width = 10.0
height = 10.0

[[leaf]]
name = "b"
x = 3.0
y = 3.0
width = 10.0
height = 10.0
group = 2

[[cluster]]
name = "outer"
x = -20.0
y = -10.0
width = 60.0
height = 40.0
margin = { left = 2.0, right = 3.0 }

[[cluster]]
name = "frame"
x = 100.0
y = 0.0
width = 20.0
height = 10.0
fixed = true

[[exempt]]
members = ["a", "b"]
"#;

    #[test]
    fn test_parse_scene() {
        let scene = Scene::from_toml_str(SCENE).unwrap();
        assert_eq!(scene.config.min_separation, 0.25);
        assert_eq!(scene.leaves.len(), 2);
        assert_eq!(scene.leaves[1].group, 2);
        assert_eq!(scene.clusters[0].margin, Margin::new(2.0, 3.0, 0.0, 0.0));
        assert!(scene.clusters[1].fixed);
        assert_eq!(scene.exempt_groups[0].members, vec!["a", "b"]);
    }

    #[test]
    fn test_layout_assigns_ids_in_order() {
        let layout = Scene::from_toml_str(SCENE).unwrap().layout().unwrap();
        let ids: Vec<_> = layout
            .participants
            .iter()
            .map(|p| (p.name.as_str(), p.id()))
            .collect();
        assert_eq!(ids, vec![("a", 0), ("b", 1), ("outer", 2), ("frame", 4)]);
        assert_eq!(layout.vars.len(), 5);
        assert_eq!(layout.vars.desired_position(Dim::Horizontal, 0), 5.0);
        assert_eq!(layout.vars.desired_position(Dim::Horizontal, 3), 40.0);
        assert_eq!(layout.vars.desired_position(Dim::Vertical, 4), 5.0);
        assert!(layout.exemptions.is_exempt(0, 1));
    }

    #[test]
    fn test_bounds_strip_cluster_margin() {
        let layout = Scene::from_toml_str(SCENE).unwrap().layout().unwrap();
        let outer = &layout.participants[2];
        assert_eq!(outer.bounds(&layout.vars), Rect::new(-20.0, -10.0, 60.0, 40.0));
        let frame = &layout.participants[3];
        assert_eq!(frame.bounds(&layout.vars), Rect::new(100.0, 0.0, 20.0, 10.0));
    }

    #[test]
    fn test_unknown_exempt_member() {
        let scene = Scene::from_toml_str(
            r#"
[[leaf]]
name = "a"
x = 0.0
y = 0.0
width = 1.0
height = 1.0

[[exempt]]
members = ["a", "ghost"]
"#,
        )
        .unwrap();
        match scene.layout() {
            Err(SceneError::UnknownParticipant { group, name }) => {
                assert_eq!(group, 0);
                assert_eq!(name, "ghost");
            }
            other => panic!("Expected UnknownParticipant, got: {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_name() {
        let scene = Scene::from_toml_str(
            r#"
[[leaf]]
name = "a"
x = 0.0
y = 0.0
width = 1.0
height = 1.0

[[cluster]]
name = "a"
x = 0.0
y = 0.0
width = 1.0
height = 1.0
"#,
        )
        .unwrap();
        assert!(matches!(
            scene.layout(),
            Err(SceneError::DuplicateName { name }) if name == "a"
        ));
    }
}
