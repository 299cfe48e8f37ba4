use crate::config::*;
use bevy::math::Vec2;

/// Stable identity of a food item within one world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FoodId(pub u64);

/// A stationary food item. Eating it grants a fixed amount of energy.
#[derive(Debug, Clone, PartialEq)]
pub struct Food {
    pub id: FoodId,
    pub position: Vec2,
    pub radius: f32,
    pub age: u32,
}

impl Food {
    pub fn new(id: FoodId, position: Vec2) -> Self {
        Self {
            id,
            position,
            radius: FOOD_RADIUS,
            age: 0,
        }
    }

    /// Age the food by one tick. Returns false once it has outlived `lifetime`.
    pub fn update(&mut self, lifetime: Option<u32>) -> bool {
        self.age = self.age.saturating_add(1);
        lifetime.is_none_or(|limit| self.age <= limit)
    }
}
