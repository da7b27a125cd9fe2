//! ASCII maze supplier for the command-line driver.

use anyhow::{bail, Context, Result};
use maze_pursuit_core::{CellCoord, Personality, Tile, WallKind};
use maze_pursuit_world::Grid;

/// Built-in demo maze: outer wall, a central pursuer home behind a gate,
/// four energizers, and a pellet field.
pub(crate) const DEMO_MAZE: &str = "\
+-----------------+
|........|........|
|o.--.--.|.--.--.o|
|.................|
|.--.+---=---+.--.|
|....|A B C D|....|
|.--.+-------+.--.|
|.................|
|o.--.--.P.--.--.o|
|........|........|
+-----------------+";

/// Maze description decoded from ASCII art.
pub(crate) struct ParsedMaze {
    /// Tile grid with spawn markers replaced by empty floor.
    pub(crate) grid: Grid,
    /// Cell the pursued agent starts on.
    pub(crate) pursued_spawn: CellCoord,
    /// Pursuer personalities and spawn cells ordered `A` through `D`.
    pub(crate) pursuer_spawns: Vec<(Personality, CellCoord)>,
}

/// Decodes an ASCII maze into a grid plus spawn positions.
///
/// `-`, `|`, and `+` are wall segments, `.` a pellet, `o` an energizer, `=`
/// the home gate, and a space open floor. `P` marks the pursued agent's
/// spawn; `A` through `D` mark pursuer spawns with the direct, lookahead,
/// ambush, and skittish personalities respectively. Spawn markers stand on
/// empty floor.
pub(crate) fn parse(text: &str) -> Result<ParsedMaze> {
    let mut rows = Vec::new();
    let mut pursued_spawn = None;
    let mut pursuer_spawns: Vec<(Personality, CellCoord)> = Vec::new();

    for (row_index, line) in text.lines().enumerate() {
        let mut row = Vec::new();
        for (column_index, glyph) in line.chars().enumerate() {
            let cell = CellCoord::new(
                u32::try_from(column_index).context("maze wider than the coordinate space")?,
                u32::try_from(row_index).context("maze taller than the coordinate space")?,
            );
            let tile = match glyph {
                '-' => Tile::Wall(WallKind::Horizontal),
                '|' => Tile::Wall(WallKind::Vertical),
                '+' => Tile::Wall(WallKind::CornerNw),
                '.' => Tile::Pellet,
                'o' => Tile::Energizer,
                '=' => Tile::Gate,
                ' ' => Tile::Empty,
                'P' => {
                    if pursued_spawn.replace(cell).is_some() {
                        bail!("maze defines more than one pursued spawn");
                    }
                    Tile::Empty
                }
                'A' | 'B' | 'C' | 'D' => {
                    let personality = match glyph {
                        'A' => Personality::Direct,
                        'B' => Personality::Lookahead,
                        'C' => Personality::Ambush,
                        _ => Personality::Skittish,
                    };
                    if pursuer_spawns.iter().any(|(p, _)| *p == personality) {
                        bail!("maze defines pursuer '{glyph}' more than once");
                    }
                    pursuer_spawns.push((personality, cell));
                    Tile::Empty
                }
                other => bail!(
                    "unsupported maze glyph '{other}' at row {row_index}, column {column_index}"
                ),
            };
            row.push(tile);
        }
        rows.push(row);
    }

    let grid = Grid::from_rows(rows).context("maze rows do not form a rectangular grid")?;
    let Some(pursued_spawn) = pursued_spawn else {
        bail!("maze defines no pursued spawn");
    };
    pursuer_spawns.sort_by_key(|(personality, _)| *personality as u8);

    Ok(ParsedMaze {
        grid,
        pursued_spawn,
        pursuer_spawns,
    })
}
