//! Auto-arrange engine.
//!
//! Turns a `Layering` into canvas coordinates. Each layer is laid out on
//! its own row: a person and their same-layer spouses form one unit, units
//! are packed left to right with fixed spacing, and the row is centered in
//! the canvas.
//!
//! The engine never fails. An empty graph yields an empty layout and an
//! unusable canvas width falls back to the configured default.

use crate::builder::GraphBuilder;
use crate::graph::{FamilyGraph, NodeId};
use crate::layering::Layering;
use lineage_core::{
    random_coordinate, Person, Relationship, DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

/// Geometry used by the layout engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    pub node_width: f64,
    pub node_height: f64,
    /// Gap between units on a row.
    pub horizontal_spacing: f64,
    /// Gap between rows.
    pub vertical_spacing: f64,
    /// Gap between spouses inside one unit.
    pub spouse_gap: f64,
    pub top_margin: f64,
    pub min_left_margin: f64,
    /// Used when the caller's canvas width is zero or not finite.
    pub default_canvas_width: f64,
    pub default_canvas_height: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 224.0,
            node_height: 100.0,
            horizontal_spacing: 80.0,
            vertical_spacing: 100.0,
            spouse_gap: 20.0,
            top_margin: 50.0,
            min_left_margin: 50.0,
            default_canvas_width: DEFAULT_CANVAS_WIDTH,
            default_canvas_height: DEFAULT_CANVAS_HEIGHT,
        }
    }
}

impl LayoutConfig {
    /// Vertical position of a layer.
    pub fn row_y(&self, layer: usize) -> f64 {
        layer as f64 * (self.node_height + self.vertical_spacing) + self.top_margin
    }

    /// Width of a unit holding `members` people side by side.
    pub fn unit_width(&self, members: usize) -> f64 {
        if members == 0 {
            return 0.0;
        }
        members as f64 * self.node_width + (members - 1) as f64 * self.spouse_gap
    }

    /// The canvas width to lay out against.
    pub fn effective_width(&self, canvas_width: f64) -> f64 {
        if canvas_width.is_finite() && canvas_width > 0.0 {
            canvas_width
        } else {
            self.default_canvas_width
        }
    }
}

/// Final position of one person.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub layer: usize,
}

/// The result of one layout pass.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    /// Placements in graph insertion order.
    pub placements: Vec<Placement>,
    /// The layering the placements were derived from.
    pub layering: Layering,
    /// The canvas width actually used.
    pub canvas_width: f64,
}

impl Layout {
    /// Looks up the placement for a person id.
    pub fn get(&self, id: &str) -> Option<&Placement> {
        self.placements.iter().find(|p| p.id == id)
    }

    /// Deepest layer in use.
    pub fn max_layer(&self) -> Option<usize> {
        self.placements.iter().map(|p| p.layer).max()
    }
}

/// A run of people placed side by side: someone plus same-layer spouses.
struct Unit {
    members: Vec<NodeId>,
    width: f64,
}

/// Computes layouts with a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    config: LayoutConfig,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Lays out every person in the graph.
    pub fn compute(&self, graph: &FamilyGraph, canvas_width: f64) -> Layout {
        let canvas_width = self.config.effective_width(canvas_width);
        if graph.is_empty() {
            return Layout {
                canvas_width,
                ..Layout::default()
            };
        }

        let layering = Layering::compute(graph);
        let mut positions: HashMap<NodeId, (f64, f64, usize)> = HashMap::new();

        for (layer, members) in layering.layers() {
            let y = self.config.row_y(layer);
            let units = self.units(graph, &layering, layer, members);

            let row_width: f64 = units.iter().map(|u| u.width).sum::<f64>()
                + units.len().saturating_sub(1) as f64 * self.config.horizontal_spacing;
            let mut x = ((canvas_width - row_width) / 2.0).max(self.config.min_left_margin);

            for unit in &units {
                let mut member_x = x;
                for &node in &unit.members {
                    positions.insert(node, (member_x, y, layer));
                    member_x += self.config.node_width + self.config.spouse_gap;
                }
                x += unit.width + self.config.horizontal_spacing;
            }

            debug!(
                "Layer {}: {} people in {} units, row width {}",
                layer,
                members.len(),
                units.len(),
                row_width
            );
        }

        let placements = graph
            .node_indexes()
            .filter_map(|node| {
                let (x, y, layer) = positions.get(&node).copied()?;
                let person = graph.get(node)?;
                Some(Placement {
                    id: person.id.clone(),
                    x,
                    y,
                    layer,
                })
            })
            .collect();

        Layout {
            placements,
            layering,
            canvas_width,
        }
    }

    /// Groups a layer into units ordered left to right.
    fn units(
        &self,
        graph: &FamilyGraph,
        layering: &Layering,
        layer: usize,
        members: &[NodeId],
    ) -> Vec<Unit> {
        let mut processed: HashSet<NodeId> = HashSet::new();
        let mut units = Vec::new();

        for &node in members {
            if !processed.insert(node) {
                continue;
            }
            let mut group = vec![node];
            for spouse in graph.spouse_indexes(node) {
                if layering.layer(spouse) == Some(layer) && processed.insert(spouse) {
                    group.push(spouse);
                }
            }
            group.sort_by(|&a, &b| compare_existing(graph, a, b));

            units.push(Unit {
                width: self.config.unit_width(group.len()),
                members: group,
            });
        }

        units.sort_by(|a, b| compare_existing(graph, a.members[0], b.members[0]));
        units
    }
}

/// Orders two nodes by their current x (unset counts as 0), then by id.
fn compare_existing(graph: &FamilyGraph, a: NodeId, b: NodeId) -> std::cmp::Ordering {
    let key = |node: NodeId| {
        graph
            .get(node)
            .map(|p| (p.x.filter(|x| x.is_finite()).unwrap_or(0.0), p.id.as_str()))
            .unwrap_or((0.0, ""))
    };
    let (ax, aid) = key(a);
    let (bx, bid) = key(b);
    ax.total_cmp(&bx).then_with(|| aid.cmp(bid))
}

/// Auto-arranges a set of people, returning updated copies.
///
/// Uses the thread-local RNG for the last-resort fallback.
pub fn arrange(
    persons: &[Person],
    relationships: &[Relationship],
    canvas_width: f64,
    config: &LayoutConfig,
) -> Vec<Person> {
    arrange_with_rng(
        persons,
        relationships,
        canvas_width,
        config,
        &mut rand::thread_rng(),
    )
}

/// Auto-arranges a set of people with an explicit RNG.
pub fn arrange_with_rng<R: Rng + ?Sized>(
    persons: &[Person],
    relationships: &[Relationship],
    canvas_width: f64,
    config: &LayoutConfig,
    rng: &mut R,
) -> Vec<Person> {
    if persons.is_empty() {
        return Vec::new();
    }

    let graph = GraphBuilder::from_parts(persons, relationships).build();
    let layout = LayoutEngine::new(config.clone()).compute(&graph, canvas_width);
    apply_layout(persons, &layout, config, rng)
}

/// Copies computed positions onto `persons`.
///
/// Every person the layout placed gets its computed position. Anyone it
/// could not (a repeated id) keeps their position, or gets a random one
/// within the canvas if they had none. That fallback is an approximation
/// and may overlap other people.
pub fn apply_layout<R: Rng + ?Sized>(
    persons: &[Person],
    layout: &Layout,
    config: &LayoutConfig,
    rng: &mut R,
) -> Vec<Person> {
    let rows = layout.max_layer().map_or(1, |max| max + 1) as f64;

    let mut placed: HashSet<&str> = HashSet::new();
    let mut fallbacks = 0usize;

    let arranged = persons
        .iter()
        .map(|original| {
            let first_with_id = placed.insert(original.id.as_str());
            let mut person = original.clone();
            match layout.get(&person.id).filter(|_| first_with_id) {
                Some(placement) => {
                    person.x = Some(placement.x);
                    person.y = Some(placement.y);
                }
                None => {
                    fallbacks += 1;
                    if !person.x.is_some_and(f64::is_finite) {
                        person.x = Some(random_coordinate(
                            rng,
                            layout.canvas_width,
                            config.min_left_margin,
                        ));
                    }
                    if !person.y.is_some_and(f64::is_finite) {
                        let height = (config.node_height + config.vertical_spacing) * rows;
                        person.y = Some(random_coordinate(rng, height, config.top_margin));
                    }
                }
            }
            person
        })
        .collect();

    if fallbacks > 0 {
        warn!("{} people could not be laid out and were placed loosely", fallbacks);
    }
    info!(
        "Arranged {} people over {} generations",
        layout.placements.len(),
        rows as usize
    );
    arranged
}

#[cfg(test)]
mod tests {
    use super::*;
    use lineage_core::{FamilyDocument, SpouseStatus};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn run(persons: &[Person], edges: &[Relationship], width: f64) -> Vec<Person> {
        let mut rng = StdRng::seed_from_u64(1);
        arrange_with_rng(persons, edges, width, &LayoutConfig::default(), &mut rng)
    }

    fn pos<'a>(people: &'a [Person], id: &str) -> (f64, f64) {
        people
            .iter()
            .find(|p| p.id == id)
            .and_then(|p| p.position())
            .unwrap()
    }

    #[test]
    fn test_parent_then_child() {
        let people = vec![Person::new("a", "A"), Person::new("b", "B")];
        let edges = vec![Relationship::parent_child("e1", "a", "b")];
        let out = run(&people, &edges, 800.0);

        assert_eq!(pos(&out, "a"), (288.0, 50.0));
        assert_eq!(pos(&out, "b"), (288.0, 250.0));
    }

    #[test]
    fn test_spouses_share_a_row_side_by_side() {
        let people = vec![Person::new("b", "B"), Person::new("a", "A")];
        let edges = vec![Relationship::spouse("e1", "b", "a", SpouseStatus::Married)];
        let out = run(&people, &edges, 800.0);

        let (ax, ay) = pos(&out, "a");
        let (bx, by) = pos(&out, "b");
        assert_eq!(ay, by);
        // (800 - (2 * 224 + 20)) / 2
        assert_eq!(ax, 166.0);
        assert_eq!(bx - ax, 224.0 + 20.0);
    }

    #[test]
    fn test_row_respects_min_left_margin() {
        let people: Vec<Person> = (0..5).map(|i| Person::new(format!("p{}", i), "P")).collect();
        let out = run(&people, &[], 800.0);

        let xs: Vec<f64> = out.iter().map(|p| p.x.unwrap()).collect();
        assert_eq!(xs[0], 50.0);
        for pair in xs.windows(2) {
            assert_eq!(pair[1] - pair[0], 224.0 + 80.0);
        }
    }

    #[test]
    fn test_existing_x_orders_units() {
        let people = vec![
            Person::new("a", "A").at(500.0, 0.0),
            Person::new("b", "B").at(100.0, 0.0),
        ];
        let out = run(&people, &[], 800.0);
        assert!(pos(&out, "b").0 < pos(&out, "a").0);
    }

    #[test]
    fn test_zero_width_uses_default() {
        let people = vec![Person::new("a", "A")];
        assert_eq!(run(&people, &[], 0.0), run(&people, &[], 800.0));
        assert_eq!(run(&people, &[], f64::NAN), run(&people, &[], 800.0));
    }

    #[test]
    fn test_empty_input() {
        assert!(run(&[], &[], 800.0).is_empty());
        let layout = LayoutEngine::default().compute(&FamilyGraph::new(), 0.0);
        assert!(layout.placements.is_empty());
        assert_eq!(layout.canvas_width, 800.0);
    }

    #[test]
    fn test_repeated_id_falls_back_inside_canvas() {
        let people = vec![Person::new("a", "A"), Person::new("a", "Shadow")];
        let out = run(&people, &[], 800.0);

        assert_eq!(out[0].position(), Some((288.0, 50.0)));
        let (x, y) = out[1].position().unwrap();
        assert!((50.0..=50.0 + 640.0).contains(&x));
        assert!((50.0..=50.0 + 160.0).contains(&y));
    }

    #[test]
    fn test_sample_tree_is_idempotent() {
        let doc = FamilyDocument::sample();
        let once = run(&doc.nodes, &doc.edges, 1200.0);
        let twice = run(&once, &doc.edges, 1200.0);
        assert_eq!(once, twice);

        // John and Jane share the top row, their children the next
        assert_eq!(pos(&once, "1").1, pos(&once, "2").1);
        assert_eq!(pos(&once, "3").1, 250.0);
        // Alice married Charlie, so Charlie is pulled down to her row
        assert_eq!(pos(&once, "5").1, pos(&once, "4").1);
    }

    #[test]
    fn test_config_fills_missing_fields() {
        let config: LayoutConfig =
            serde_json::from_str(r#"{"nodeWidth": 180, "topMargin": 10}"#).unwrap();
        assert_eq!(config.node_width, 180.0);
        assert_eq!(config.top_margin, 10.0);
        assert_eq!(config.vertical_spacing, 100.0);
        assert_eq!(config.row_y(2), 10.0 + 2.0 * 200.0);
    }
}
