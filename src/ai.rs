// Probability-based target selection over the opponent view.
// Fixed-size matrices, no_std friendly.

use crate::{
    board::{Cell, Grid},
    common::Coord,
    config::BOARD_SIZE,
    ship::Orientation,
};
use alloc::vec::Vec;
use rand::Rng;

const GRID_SIZE: usize = BOARD_SIZE as usize;

/// Placements covering observed hits get this much more weight per hit, so
/// squares next to a confirmed hit stand out.
const HIT_BIAS: f64 = 10.0;

pub type Pdf = [[f64; GRID_SIZE]; GRID_SIZE];

/// Compute a probability density over all unattacked squares given the view of
/// the opponent board and the lengths of ships still afloat. Each entry sums
/// the relative likelihood of a ship segment occupying that coordinate.
pub fn calc_pdf(view: &Grid, remaining_lengths: &[usize]) -> Pdf {
    let mut matrix = [[0.0f64; GRID_SIZE]; GRID_SIZE];
    let cells = view.rows();

    for &len in remaining_lengths.iter() {
        if len == 0 || len > GRID_SIZE {
            continue;
        }
        for orient in [Orientation::Horizontal, Orientation::Vertical] {
            let (max_row, max_col) = match orient {
                Orientation::Vertical => (GRID_SIZE - len + 1, GRID_SIZE),
                Orientation::Horizontal => (GRID_SIZE, GRID_SIZE - len + 1),
            };
            for r in 0..max_row {
                for c in 0..max_col {
                    let mut valid = true;
                    let mut n_hits = 0i32;
                    for k in 0..len {
                        let (rr, cc) = orient.offset((r, c), k);
                        match cells[rr][cc] {
                            Cell::Miss => {
                                valid = false;
                                break;
                            }
                            Cell::Hit => n_hits += 1,
                            _ => {}
                        }
                    }
                    if !valid {
                        continue;
                    }
                    let weight = libm::pow(HIT_BIAS, n_hits as f64);
                    for k in 0..len {
                        let (rr, cc) = orient.offset((r, c), k);
                        if !cells[rr][cc].is_attacked() {
                            matrix[rr][cc] += weight;
                        }
                    }
                }
            }
        }
    }

    normalize(matrix)
}

fn normalize(mut matrix: Pdf) -> Pdf {
    let total: f64 = matrix.iter().flat_map(|row| row.iter()).sum();
    if total == 0.0 {
        return matrix;
    }
    for row in matrix.iter_mut() {
        for v in row.iter_mut() {
            *v /= total;
        }
    }
    matrix
}

/// Sample a coordinate from a probability matrix using a temperature
/// parameter. Returns `None` when the matrix carries no weight.
pub fn sample_pdf<R: Rng + ?Sized>(pdf: &Pdf, temperature: f64, rng: &mut R) -> Option<Coord> {
    let mut adjusted = [[0.0f64; GRID_SIZE]; GRID_SIZE];
    let mut total = 0.0;
    for r in 0..GRID_SIZE {
        for c in 0..GRID_SIZE {
            let v = libm::pow(pdf[r][c], 1.0 / temperature);
            adjusted[r][c] = v;
            total += v;
        }
    }
    if total <= 0.0 {
        return None;
    }
    let threshold: f64 = rng.random_range(0.0..total);
    let mut cumulative = 0.0;
    let mut last = None;
    for r in 0..GRID_SIZE {
        for c in 0..GRID_SIZE {
            if adjusted[r][c] <= 0.0 {
                continue;
            }
            cumulative += adjusted[r][c];
            last = Some((r, c));
            if threshold < cumulative {
                return last;
            }
        }
    }
    last
}

/// Pick a target: sample the PDF, falling back to a uniformly random
/// unattacked cell. `None` only when every cell was attacked.
pub fn choose_target<R: Rng + ?Sized>(view: &Grid, lengths: &[usize], rng: &mut R) -> Option<Coord> {
    let pdf = calc_pdf(view, lengths);
    // Lower temperature biases sampling towards likely ship locations.
    if let Some(coord) = sample_pdf(&pdf, 0.5, rng) {
        return Some(coord);
    }
    let open: Vec<Coord> = view.unattacked().collect();
    if open.is_empty() {
        return None;
    }
    Some(open[rng.random_range(0..open.len())])
}
