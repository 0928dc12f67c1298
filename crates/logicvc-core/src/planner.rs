//! Layer placement inside the shared video memory pool.
//!
//! Layers are placed by the operator through a row offset each; their physical
//! order is not declared. A layer may grow until the next layer by address or,
//! for the physically last layer, until the end of the pool.

use log::debug;
use logicvc_registers::map::{MAX_LAYER_BUFFERS, MAX_LINES};

use crate::error::{LogicvcError, Result};

/// Lines removed per step while fitting the physically last layer into the
/// pool. Empirical; not derived from the buffer granularity.
pub const LAST_LAYER_LINE_STEP: u32 = 64;

/// Planner input for one layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanInput {
    /// Start of the layer in rows of its own stride.
    pub offset: u32,
    /// Rows per frame buffer.
    pub buffer_offset: u32,
    /// Row stride in pixels.
    pub width: u32,
    /// Stored bits per pixel.
    pub bpp: u32,
}

impl PlanInput {
    fn row_bytes(&self) -> u64 {
        u64::from(self.width) * u64::from(self.bpp / 8)
    }

    fn address(&self) -> u64 {
        u64::from(self.offset) * self.row_bytes()
    }
}

/// Planned placement of one layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerPlan {
    /// Physical address of the first row.
    pub address: u64,
    /// Bytes reserved for the layer.
    pub size: u64,
    /// Addressable lines (virtual height).
    pub height: u32,
    /// Buffer count in the high nibble, layer index in the low nibble.
    pub info: u8,
}

impl LayerPlan {
    #[must_use]
    pub const fn buffer_count(&self) -> u32 {
        (self.info >> 4) as u32
    }

    #[must_use]
    pub const fn layer_index(&self) -> u8 {
        self.info & 0x0F
    }
}

/// Place every layer of `layers` inside `[pool_base, pool_high)`.
///
/// The output keeps the order of `layers`. Heights of zero and buffer counts
/// of zero are reported as-is; [`validate`] turns them into errors.
#[must_use]
pub fn plan(layers: &[PlanInput], pool_base: u64, pool_high: u64) -> Vec<LayerPlan> {
    let pool_size = pool_high.saturating_sub(pool_base);

    layers
        .iter()
        .enumerate()
        .map(|(id, layer)| {
            let row_bytes = layer.row_bytes();
            let address = layer.address();

            let mut height = match next_layer(layers, id) {
                Some(next) => {
                    let lines = (layers[next].address() - address) / row_bytes.max(1);
                    u32::try_from(lines).unwrap_or(u32::MAX)
                }
                None => last_layer_height(row_bytes, address, pool_size),
            };
            height = height
                .min(MAX_LINES)
                .min(MAX_LAYER_BUFFERS.saturating_mul(layer.buffer_offset));

            let buffers = height.checked_div(layer.buffer_offset).unwrap_or(0);
            let plan = LayerPlan {
                address: pool_base + address,
                size: row_bytes * u64::from(height),
                height,
                info: ((buffers as u8) << 4) | (id as u8 & 0x0F),
            };
            debug!(
                "layer {id}: address {:#x} size {:#x} height {} buffers {}",
                plan.address, plan.size, plan.height, buffers
            );
            plan
        })
        .collect()
}

/// Reject plans that cannot back a usable layer.
///
/// # Errors
/// [`LogicvcError::OverlappingLayers`] when two layers share an address,
/// [`LogicvcError::EmptyLayer`] for a zero height,
/// [`LogicvcError::NoBuffers`] when not even one buffer fits and
/// [`LogicvcError::Config`] when a layer reaches past the pool.
pub fn validate(
    layers: &[PlanInput],
    plans: &[LayerPlan],
    pool_base: u64,
    pool_high: u64,
) -> Result<()> {
    for (id, (layer, plan)) in layers.iter().zip(plans).enumerate() {
        if let Some(other) = plans[..id].iter().position(|p| p.address == plan.address) {
            return Err(LogicvcError::OverlappingLayers {
                first: other,
                second: id,
            });
        }
        if plan.height == 0 {
            return Err(LogicvcError::EmptyLayer { layer: id });
        }
        if plan.buffer_count() == 0 {
            return Err(LogicvcError::NoBuffers {
                layer: id,
                buffer_offset: layer.buffer_offset,
                height: plan.height,
            });
        }
        if plan.address + plan.size > pool_high || plan.address < pool_base {
            return Err(LogicvcError::Config(format!(
                "layer {id} ends at {:#x}, past the pool end {pool_high:#x}",
                plan.address + plan.size
            )));
        }
    }
    Ok(())
}

/// Index of the layer with the smallest address strictly above layer `id`'s.
/// Ties keep the first one found.
fn next_layer(layers: &[PlanInput], id: usize) -> Option<usize> {
    let address = layers[id].address();
    let mut next: Option<(usize, u64)> = None;
    for (j, other) in layers.iter().enumerate() {
        let candidate = other.address();
        if candidate <= address {
            continue;
        }
        if next.map_or(true, |(_, best)| candidate < best) {
            next = Some((j, candidate));
        }
    }
    next.map(|(j, _)| j)
}

/// Raw fit for the physically last layer, searched from one line above the
/// hardware limit. The caller clamps it to [`MAX_LINES`].
fn last_layer_height(row_bytes: u64, address: u64, pool_size: u64) -> u32 {
    let mut height = MAX_LINES + 1;
    while height > 0 && row_bytes * u64::from(height) + address > pool_size {
        height = height.saturating_sub(LAST_LAYER_LINE_STEP);
    }
    height
}
