use serde::{Deserialize, Serialize};
use tiledrive_common::Color;

use crate::handle::AssetHandle;

/// Floor colors indexed by floor type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FloorPalette(Vec<Color>);

impl FloorPalette {
    pub fn new(colors: Vec<Color>) -> Self {
        Self(colors)
    }

    pub fn get(&self, floor: u16) -> Option<Color> {
        self.0.get(usize::from(floor)).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Loaded obstacle models. Obstacle code `v > 0` selects entry `v - 1`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetVariants(Vec<AssetHandle>);

impl AssetVariants {
    pub fn new(handles: Vec<AssetHandle>) -> Self {
        Self(handles)
    }

    /// Resolve an obstacle code. Code 0 (empty cell) never resolves.
    pub fn resolve(&self, variant: u16) -> Option<&AssetHandle> {
        let index = usize::from(variant).checked_sub(1)?;
        self.0.get(index)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AssetHandle> {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::{AssetId, MeshNode};

    fn handle(id: u64, name: &str) -> AssetHandle {
        AssetHandle::new(AssetId(id), name, vec![MeshNode::unit(name, Color::GRAY)])
    }

    #[test]
    fn variants_are_one_based() {
        let variants = AssetVariants::new(vec![handle(1, "tree"), handle(2, "rock")]);
        assert!(variants.resolve(0).is_none());
        assert_eq!(variants.resolve(1).unwrap().name, "tree");
        assert_eq!(variants.resolve(2).unwrap().name, "rock");
        assert!(variants.resolve(3).is_none());
    }

    #[test]
    fn palette_lookup() {
        let palette = FloorPalette::new(vec![Color::GRAY, Color::WHITE]);
        assert_eq!(palette.len(), 2);
        assert_eq!(palette.get(1), Some(Color::WHITE));
        assert_eq!(palette.get(2), None);
    }
}
