pub mod edit_bricks;
pub mod wall_bricks;
