//! Back-to-front ordering of draw groups.

use std::cmp::Ordering;

use super::DrawGroup;
use crate::mesh::MeshNode;
use crate::util::Vec3;

/// Distances closer than this are the same distance.
pub const SAME_DISTANCE: f32 = 1e-5;
/// Distances closer than this are ordered by hierarchy instead.
pub const UNRESOLVED_DISTANCE: f32 = 5.0;

/// Draw order for transparent composition.
///
/// Groups whose texture has the always-last extension come last. The
/// rest are ordered farthest first. Equal distances put a parent's group
/// first; distances too close to resolve fall back to mesh index.
pub struct TransparencyOrder<'a> {
    meshes: &'a [MeshNode],
    origin: Vec3,
    always_last: String,
}

impl<'a> TransparencyOrder<'a> {
    /// Order seen from `origin`.
    pub fn new(meshes: &'a [MeshNode], origin: Vec3, always_last_extension: &str) -> Self {
        Self {
            meshes,
            origin,
            always_last: always_last_extension.to_ascii_lowercase(),
        }
    }

    fn is_last(&self, texture: &str) -> bool {
        !self.always_last.is_empty() && texture.to_ascii_lowercase().ends_with(&self.always_last)
    }

    /// Distance used for ordering: center distance plus the box's half-diagonal.
    pub fn distance(&self, group: &DrawGroup) -> f32 {
        (group.center - self.origin).length() + group.bounding_box.range.length()
    }

    fn is_parent_of(&self, parent: usize, child: usize) -> bool {
        self.meshes.get(child).and_then(MeshNode::parent) == Some(parent)
    }

    /// Compare two groups; `Less` draws first.
    pub fn compare(&self, x: &DrawGroup, y: &DrawGroup) -> Ordering {
        match (self.is_last(&x.texture), self.is_last(&y.texture)) {
            (true, false) => return Ordering::Greater,
            (false, true) => return Ordering::Less,
            _ => {}
        }

        let dx = self.distance(x);
        let dy = self.distance(y);
        let diff = (dx - dy).abs();

        if diff < SAME_DISTANCE {
            if self.is_parent_of(y.mesh, x.mesh) {
                return Ordering::Greater;
            }
            if self.is_parent_of(x.mesh, y.mesh) {
                return Ordering::Less;
            }
            return Ordering::Equal;
        }

        if diff < UNRESOLVED_DISTANCE {
            return x.mesh.cmp(&y.mesh);
        }

        dy.total_cmp(&dx)
    }

    /// Stable sort by [`compare`](Self::compare).
    ///
    /// The thresholds make the relation non-transitive, which the std
    /// sorts may reject, so a plain insertion sort is used.
    pub fn sort(&self, groups: &mut [DrawGroup]) {
        for i in 1..groups.len() {
            let mut j = i;
            while j > 0 && self.compare(&groups[j - 1], &groups[j]) == Ordering::Greater {
                groups.swap(j - 1, j);
                j -= 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::resolve_links;
    use crate::util::BoundingBox;

    fn group(texture: &str, mesh: usize, z: f32) -> DrawGroup {
        DrawGroup {
            texture: texture.to_string(),
            mesh,
            center: Vec3::new(0.0, 0.0, z),
            bounding_box: BoundingBox::default(),
            ..DrawGroup::default()
        }
    }

    fn family() -> Vec<MeshNode> {
        let mut meshes = vec![
            MeshNode::new("other"),
            MeshNode::new("root"),
            MeshNode::new("child").with_parent("root"),
        ];
        resolve_links(&mut meshes).expect("links");
        meshes
    }

    #[test]
    fn test_always_last_extension() {
        let meshes = family();
        let order = TransparencyOrder::new(&meshes, Vec3::ZERO, ".tga");
        let near_tga = group("glass.TGA", 0, 1.0);
        let far_bmp = group("wall.bmp", 0, 100.0);
        assert_eq!(order.compare(&near_tga, &far_bmp), Ordering::Greater);
        assert_eq!(order.compare(&far_bmp, &near_tga), Ordering::Less);
    }

    #[test]
    fn test_farther_first() {
        let meshes = family();
        let order = TransparencyOrder::new(&meshes, Vec3::ZERO, ".tga");
        let near = group("a.bmp", 2, 1.0);
        let far = group("b.bmp", 0, 50.0);
        assert_eq!(order.compare(&far, &near), Ordering::Less);
        assert_eq!(order.compare(&near, &far), Ordering::Greater);
    }

    #[test]
    fn test_parent_first_at_same_distance() {
        let meshes = family();
        let order = TransparencyOrder::new(&meshes, Vec3::ZERO, ".tga");
        let parent = group("a.bmp", 1, 10.0);
        let child = group("b.bmp", 2, 10.0);

        assert_eq!(order.compare(&parent, &child), Ordering::Less);
        assert_eq!(order.compare(&child, &parent), Ordering::Greater);
        assert_eq!(order.compare(&parent, &child), order.compare(&child, &parent).reverse());

        // 0.3 apart is ordered by index, which here also puts the parent first.
        let child = group("b.bmp", 2, 10.3);
        assert_eq!(order.compare(&parent, &child), Ordering::Less);
        assert_eq!(order.compare(&parent, &child), order.compare(&child, &parent).reverse());
    }

    #[test]
    fn test_close_child_listed_first_sorts_first() {
        let mut meshes = vec![MeshNode::new("child").with_parent("root"), MeshNode::new("root")];
        resolve_links(&mut meshes).expect("links");
        let order = TransparencyOrder::new(&meshes, Vec3::ZERO, ".tga");
        let child = group("a.bmp", 0, 10.0);
        let parent = group("b.bmp", 1, 12.0);

        assert_eq!(order.compare(&child, &parent), Ordering::Less);
        assert_eq!(order.compare(&parent, &child), Ordering::Greater);

        // Only an exact tie lets the parent go first.
        let parent = group("b.bmp", 1, 10.0);
        assert_eq!(order.compare(&child, &parent), Ordering::Greater);
    }

    #[test]
    fn test_index_breaks_close_ties() {
        let meshes = family();
        let order = TransparencyOrder::new(&meshes, Vec3::ZERO, ".tga");
        let a = group("a.bmp", 0, 10.0);
        let b = group("b.bmp", 1, 12.0);
        assert_eq!(order.compare(&a, &b), Ordering::Less);
        assert_eq!(order.compare(&b, &a), Ordering::Greater);

        let same = group("c.bmp", 2, 10.0);
        let other = group("d.bmp", 0, 10.0);
        assert_eq!(order.compare(&same, &other), Ordering::Equal);
    }

    #[test]
    fn test_sort() {
        let meshes = family();
        let order = TransparencyOrder::new(&meshes, Vec3::ZERO, ".tga");
        let mut groups = vec![
            group("glass.tga", 0, 100.0),
            group("near.bmp", 0, 1.0),
            group("far.bmp", 1, 80.0),
        ];
        order.sort(&mut groups);
        let names: Vec<_> = groups.iter().map(|g| g.texture.as_str()).collect();
        assert_eq!(names, ["far.bmp", "near.bmp", "glass.tga"]);
    }
}
