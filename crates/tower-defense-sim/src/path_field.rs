//! Direction field over the tile map.
//!
//! Straight tiles give their own heading. Turn tiles have an entry point on
//! the side the path comes in from and an exit point on the side it leaves
//! by; a position gets the entry heading while it is closer to the entry
//! point and the exit heading after that, so a walker crossing a turn flips
//! direction exactly once, at the midpoint.

use glam::Vec2;
use tower_defense_core::constants::TILE_SIZE;
use tower_defense_core::map::{Heading, Tile, TileMap};
use tower_defense_core::types::{local_offset, TileCoord};

/// Entry and exit of a turn tile, in tile-local pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
struct TurnGeometry {
    entrance: Vec2,
    entrance_heading: Heading,
    exit: Vec2,
    exit_heading: Heading,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Cell {
    Straight(Heading),
    Turn(TurnGeometry),
}

/// Parsed map with turn geometry precomputed for every tile.
#[derive(Debug, Clone)]
pub struct PathField {
    map: TileMap,
    cells: Vec<Cell>,
}

impl PathField {
    pub fn new(map: TileMap) -> Self {
        let cells = map
            .coords()
            .map(|coord| match map.tile(coord) {
                Some(Tile::Path(heading)) => Cell::Straight(heading),
                // Blocked and open tiles fall back to turn geometry as well,
                // so walkers pushed off the path still get a direction.
                _ => Cell::Turn(turn_geometry(&map, coord)),
            })
            .collect();
        Self { map, cells }
    }

    pub fn map(&self) -> &TileMap {
        &self.map
    }

    /// Unit direction for a world position, `None` outside the map.
    pub fn direction_at(&self, position: Vec2) -> Option<Vec2> {
        let coord = TileCoord::from_world(position);
        let cell = self.cell(coord)?;
        match cell {
            Cell::Straight(heading) => Some(heading.vector()),
            Cell::Turn(turn) => {
                let local = local_offset(position);
                let to_entrance = manhattan(local, turn.entrance);
                let to_exit = manhattan(local, turn.exit);
                let heading = if to_entrance < to_exit {
                    turn.entrance_heading
                } else {
                    turn.exit_heading
                };
                Some(heading.vector())
            }
        }
    }

    fn cell(&self, coord: TileCoord) -> Option<&Cell> {
        if !self.map.contains(coord) {
            return None;
        }
        self.cells
            .get(coord.row as usize * self.map.cols() + coord.col as usize)
    }
}

fn manhattan(a: Vec2, b: Vec2) -> f32 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

/// Derive entry and exit sides of a turn from its neighbours.
///
/// Entry checks west, east, south and otherwise assumes north; exit checks
/// west, east, south and otherwise assumes north. A neighbour outside the map
/// never matches.
fn turn_geometry(map: &TileMap, coord: TileCoord) -> TurnGeometry {
    let half = TILE_SIZE / 2.0;
    let west = map.symbol(coord.offset(0, -1));
    let east = map.symbol(coord.offset(0, 1));
    let south = map.symbol(coord.offset(1, 0));

    let (entrance, entrance_heading) = if west == Some(b'>') {
        (Vec2::new(0.0, half), Heading::East)
    } else if east == Some(b'<') {
        (Vec2::new(TILE_SIZE, half), Heading::West)
    } else if south == Some(b'n') {
        (Vec2::new(half, TILE_SIZE), Heading::North)
    } else {
        (Vec2::new(half, 0.0), Heading::South)
    };

    let (exit, exit_heading) = if west == Some(b'<') {
        (Vec2::new(0.0, half), Heading::West)
    } else if east == Some(b'>') {
        (Vec2::new(TILE_SIZE, half), Heading::East)
    } else if south == Some(b'v') {
        (Vec2::new(half, TILE_SIZE), Heading::South)
    } else {
        (Vec2::new(half, 0.0), Heading::North)
    };

    TurnGeometry {
        entrance,
        entrance_heading,
        exit,
        exit_heading,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_defense_core::config::DEFAULT_MAP;

    fn default_field() -> PathField {
        PathField::new(TileMap::parse(&DEFAULT_MAP).unwrap())
    }

    /// World position of a tile-local point on a padded tile.
    fn at(coord: TileCoord, local: Vec2) -> Vec2 {
        coord.center() - Vec2::splat(TILE_SIZE / 2.0) + local
    }

    #[test]
    fn straight_tiles_ignore_sub_tile_position() {
        let field = default_field();
        // (3, 1) is '>', (4, 4) is 'v', (8, 5) is '<', (4, 6) is 'n'.
        let cases = [
            (TileCoord::new(3, 1), Vec2::X),
            (TileCoord::new(4, 4), Vec2::Y),
            (TileCoord::new(8, 5), Vec2::NEG_X),
            (TileCoord::new(4, 6), Vec2::NEG_Y),
        ];
        for (coord, expected) in cases {
            for local in [Vec2::new(1.0, 1.0), Vec2::new(16.0, 16.0), Vec2::new(31.0, 5.0)] {
                assert_eq!(field.direction_at(at(coord, local)), Some(expected), "{coord}");
            }
        }
    }

    #[test]
    fn turn_directions_are_cardinal() {
        let field = default_field();
        for coord in field.map().coords() {
            for local in [Vec2::new(2.0, 3.0), Vec2::new(16.0, 16.0), Vec2::new(30.0, 29.0)] {
                let dir = field.direction_at(at(coord, local)).unwrap();
                let cardinal = [Vec2::X, Vec2::NEG_X, Vec2::Y, Vec2::NEG_Y];
                assert!(cardinal.contains(&dir), "{coord} gave {dir}");
            }
        }
    }

    #[test]
    fn crossing_a_turn_flips_once_at_the_midpoint() {
        let field = default_field();
        // (3, 4) is 'x': entered from '>' on the west, left towards 'v' below.
        let turn = TileCoord::new(3, 4);
        let mut flips = 0;
        let mut previous = field.direction_at(at(turn, Vec2::new(0.0, 16.0))).unwrap();
        assert_eq!(previous, Vec2::X);

        let mut x = 0.0;
        while x < TILE_SIZE {
            let dir = field.direction_at(at(turn, Vec2::new(x, 16.0))).unwrap();
            if dir != previous {
                flips += 1;
                assert!((15.5..=16.5).contains(&x), "flipped at {x}");
            }
            previous = dir;
            x += 0.5;
        }
        assert_eq!(flips, 1);
        assert_eq!(previous, Vec2::Y);
    }

    #[test]
    fn map_edge_entrance_resolves_as_turn() {
        let field = default_field();
        // (3, 0) is '#' with '>' to its east; the west neighbour is off-map.
        let entrance = TileCoord::new(3, 0);
        assert_eq!(field.direction_at(entrance.center()), Some(Vec2::X));
    }

    #[test]
    fn outside_the_map_has_no_direction() {
        let field = default_field();
        assert_eq!(field.direction_at(Vec2::new(-200.0, 48.0)), None);
        assert_eq!(field.direction_at(Vec2::new(48.0, 10_000.0)), None);
    }
}
