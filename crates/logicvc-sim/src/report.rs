//! Register names for dumps.

use logicvc_registers::map::{self, common, layer, vtc, Block, CLUT_ENTRY_SIZE};

fn common_name(rel: u32) -> Option<&'static str> {
    Some(match rel {
        common::SHSY_FP => "SHSY_FP",
        common::SHSY => "SHSY",
        common::SHSY_BP => "SHSY_BP",
        common::SHSY_RES => "SHSY_RES",
        common::SVSY_FP => "SVSY_FP",
        common::SVSY => "SVSY",
        common::SVSY_BP => "SVSY_BP",
        common::SVSY_RES => "SVSY_RES",
        common::CTRL => "CTRL",
        common::DTYPE => "DTYPE",
        common::BACKGROUND => "BACKGROUND",
        common::DOUBLE_CLUT => "DOUBLE_CLUT",
        common::INT_STAT => "INT_STAT",
        common::INT_MASK => "INT_MASK",
        common::SPWRCTRL => "SPWRCTRL",
        common::IP_VERSION => "IP_VERSION",
        _ => return None,
    })
}

fn layer_name(rel: u32) -> Option<&'static str> {
    Some(match rel {
        layer::HOR_OFF => "HOR_OFF",
        layer::VER_OFF => "VER_OFF",
        layer::HOR_POS => "HOR_POS",
        layer::VER_POS => "VER_POS",
        layer::WIDTH => "WIDTH",
        layer::HEIGHT => "HEIGHT",
        layer::ALPHA => "ALPHA",
        layer::CTRL => "CTRL",
        layer::TRANSP => "TRANSP",
        _ => return None,
    })
}

/// Name of a compositor register, or its offset when it has none.
pub fn register_name(offset: u32) -> String {
    match map::decode(offset) {
        Some((Block::Common, rel)) => common_name(rel).map(str::to_owned),
        Some((Block::Layer(id), rel)) => layer_name(rel).map(|n| format!("L{id}_{n}")),
        Some((Block::Clut { layer, table }, rel)) => {
            Some(format!("CLUT{layer}.{table}[{}]", rel / CLUT_ENTRY_SIZE))
        }
        None => None,
    }
    .unwrap_or_else(|| format!("{offset:#06x}"))
}

/// Name of a timing controller register, or its offset when it has none.
pub fn vtc_register_name(offset: u32) -> String {
    let name = match offset {
        vtc::CTL => "CTL",
        vtc::GASIZE => "GASIZE",
        vtc::GPOL => "GPOL",
        vtc::GHSIZE => "GHSIZE",
        vtc::GVSIZE => "GVSIZE",
        vtc::GHSYNC => "GHSYNC",
        vtc::GVBHOFF_F0 => "GVBHOFF_F0",
        vtc::GVSYNC_F0 => "GVSYNC_F0",
        vtc::GVSHOFF_F0 => "GVSHOFF_F0",
        vtc::GVBHOFF_F1 => "GVBHOFF_F1",
        vtc::GVSYNC_F1 => "GVSYNC_F1",
        vtc::GVSHOFF_F1 => "GVSHOFF_F1",
        _ => return format!("{offset:#06x}"),
    };
    name.to_owned()
}

/// One line per register: offset, name and value.
pub fn dump(
    registers: impl IntoIterator<Item = (u32, u32)>,
    name: fn(u32) -> String,
) -> Vec<String> {
    registers
        .into_iter()
        .map(|(offset, value)| format!("{offset:#06x}  {:<14} {value:#010x}", name(offset)))
        .collect()
}
