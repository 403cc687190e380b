use tread_geom::BlockPos;

/// Parses a layered map: each row is one z line, `|` separates y levels
/// (level 0 first) and `X` marks a solid cell. Returns the solid cells'
/// offsets from the map origin.
pub fn parse_layers(rows: &[&str]) -> Vec<BlockPos> {
    let mut out = Vec::new();
    for (z, row) in rows.iter().enumerate() {
        for (y, level) in row.split('|').enumerate() {
            for (x, ch) in level.chars().enumerate() {
                if ch == 'X' {
                    out.push(BlockPos::new(x as i32, y as i32, z as i32));
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_map_to_heights() {
        let cells = parse_layers(&["X |  ", "  | X"]);
        assert_eq!(
            cells,
            vec![BlockPos::new(0, 0, 0), BlockPos::new(1, 1, 1)]
        );
    }

    #[test]
    fn blank_rows_have_no_cells() {
        assert!(parse_layers(&["   ", "   |   "]).is_empty());
    }
}
