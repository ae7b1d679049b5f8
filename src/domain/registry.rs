/// Entity registry: who occupies which cell.
///
/// A dense `Vec<Option<Entity>>` indexed by row-major offset, so lookup is
/// O(1) and two occupants can never share a cell. The registry itself does
/// not touch the tile grid; keeping both in step is `WorldState::move_tile`'s
/// job.

use super::entity::Entity;
use super::tile::TileType;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntityRegistry {
    width: usize,
    height: usize,
    slots: Vec<Option<Entity>>,
}

impl EntityRegistry {
    pub fn new(width: usize, height: usize) -> Self {
        EntityRegistry { width, height, slots: vec![None; width * height] }
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            Some(y as usize * self.width + x as usize)
        } else {
            None
        }
    }

    pub fn get(&self, x: i32, y: i32) -> Option<&Entity> {
        let i = self.index(x, y)?;
        self.slots[i].as_ref()
    }

    pub fn get_mut(&mut self, x: i32, y: i32) -> Option<&mut Entity> {
        let i = self.index(x, y)?;
        self.slots[i].as_mut()
    }

    pub fn kind_at(&self, x: i32, y: i32) -> Option<TileType> {
        self.get(x, y).map(Entity::kind)
    }

    /// Place an entity, returning whatever it replaced.
    /// Out-of-range inserts are dropped and the entity is handed back.
    pub fn insert(&mut self, x: i32, y: i32, entity: Entity) -> Option<Entity> {
        match self.index(x, y) {
            Some(i) => self.slots[i].replace(entity),
            None => Some(entity),
        }
    }

    pub fn remove(&mut self, x: i32, y: i32) -> Option<Entity> {
        let i = self.index(x, y)?;
        self.slots[i].take()
    }

    /// Move the occupant of `from` to `to`. The previous occupant of `to`,
    /// if any, is discarded. Returns false when `from` is vacant.
    pub fn relocate(&mut self, from: (i32, i32), to: (i32, i32)) -> bool {
        let (Some(src), Some(dst)) = (self.index(from.0, from.1), self.index(to.0, to.1)) else {
            return false;
        };
        match self.slots[src].take() {
            Some(entity) => {
                self.slots[dst] = Some(entity);
                true
            }
            None => false,
        }
    }

    /// Occupied positions in row-major order.
    pub fn positions(&self) -> Vec<(i32, i32)> {
        let w = self.width;
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_some())
            .map(|(i, _)| ((i % w) as i32, (i / w) as i32))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.slots.iter().flatten()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.slots.iter_mut().flatten()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn count_kind(&self, kind: TileType) -> usize {
        self.slots.iter().flatten().filter(|e| e.kind() == kind).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rock() -> Entity {
        Entity::spawn(TileType::Boulder).unwrap()
    }

    #[test]
    fn insert_get_remove() {
        let mut r = EntityRegistry::new(4, 4);
        assert!(r.is_empty());
        assert!(r.insert(1, 2, rock()).is_none());
        assert_eq!(r.kind_at(1, 2), Some(TileType::Boulder));
        assert_eq!(r.len(), 1);
        assert!(r.remove(1, 2).is_some());
        assert!(r.get(1, 2).is_none());
        assert!(r.remove(1, 2).is_none());
    }

    #[test]
    fn one_occupant_per_cell() {
        let mut r = EntityRegistry::new(3, 3);
        r.insert(1, 1, rock());
        let old = r.insert(1, 1, Entity::Amoeba);
        assert_eq!(old.map(|e| e.kind()), Some(TileType::Boulder));
        assert_eq!(r.len(), 1);
        assert_eq!(r.kind_at(1, 1), Some(TileType::Amoeba));
    }

    #[test]
    fn out_of_range_insert_is_refused() {
        let mut r = EntityRegistry::new(2, 2);
        let back = r.insert(5, 0, rock());
        assert!(back.is_some());
        assert!(r.is_empty());
        assert!(r.get(-1, 0).is_none());
    }

    #[test]
    fn relocate_moves_key() {
        let mut r = EntityRegistry::new(3, 3);
        r.insert(0, 0, rock());
        assert!(r.relocate((0, 0), (2, 1)));
        assert!(r.get(0, 0).is_none());
        assert_eq!(r.kind_at(2, 1), Some(TileType::Boulder));
        // Vacant source is a no-op
        assert!(!r.relocate((0, 0), (1, 1)));
        assert_eq!(r.len(), 1);
    }

    #[test]
    fn positions_are_row_major() {
        let mut r = EntityRegistry::new(3, 3);
        r.insert(2, 2, rock());
        r.insert(0, 1, rock());
        r.insert(2, 0, Entity::Amoeba);
        assert_eq!(r.positions(), vec![(2, 0), (0, 1), (2, 2)]);
        assert_eq!(r.count_kind(TileType::Boulder), 2);
    }
}
