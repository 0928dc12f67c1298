//! Integration tests for palette and pseudo-palette encoding.

use logicvc_core::color::format::narrow;
use logicvc_core::color::yuv::{rgb_to_ycbcr, FULL_RANGE, ITU656};
use logicvc_core::color::{encode, encode_color, Color, ColorMap, PaletteTarget, PixelFormat};
use logicvc_core::{AlphaMode, DisplayInterface, LayerType, LogicvcError};

fn rgb(bpp_virt: u32, alpha_mode: AlphaMode) -> PixelFormat {
    let bpp = match (bpp_virt, alpha_mode) {
        (8, AlphaMode::Pixel) => 16,
        (16, AlphaMode::Pixel) => 32,
        (b, _) => b,
    };
    PixelFormat {
        bpp,
        bpp_virt,
        alpha_mode,
        layer_type: LayerType::Rgb,
        swap_rb: false,
    }
}

fn ayuv() -> PixelFormat {
    PixelFormat {
        bpp: 32,
        bpp_virt: 32,
        alpha_mode: AlphaMode::Layer,
        layer_type: LayerType::YCbCr,
        swap_rb: false,
    }
}

const fn color(red: u16, green: u16, blue: u16, transp: Option<u16>) -> Color {
    Color {
        red,
        green,
        blue,
        transp,
    }
}

const WHITE: Color = color(0xFF, 0xFF, 0xFF, None);
const BLACK: Color = color(0, 0, 0, None);

fn enc(c: Color, format: PixelFormat) -> u32 {
    encode_color(c, &format, DisplayInterface::Parallel).unwrap()
}

// ============================================================================
// True-color layers (pseudo palette)
// ============================================================================

mod truecolor_tests {
    use super::*;

    #[test]
    fn rgb332_is_replicated_to_every_byte() {
        assert_eq!(enc(WHITE, rgb(8, AlphaMode::Layer)), 0xFFFF_FFFF);
        let red = color(0xFF, 0, 0, None);
        assert_eq!(enc(red, rgb(8, AlphaMode::Layer)), 0xE0E0_E0E0);
    }

    #[test]
    fn rgb332_with_pixel_alpha_is_replicated_per_half() {
        let value = enc(WHITE, rgb(8, AlphaMode::Pixel));
        assert_eq!(value, 0x07FF_07FF, "got 0x{value:08X}");
    }

    #[test]
    fn rgb565_is_replicated_per_half() {
        let red = color(0xFF, 0, 0, None);
        assert_eq!(enc(red, rgb(16, AlphaMode::Layer)), 0xF800_F800);
    }

    #[test]
    fn rgb565_with_pixel_alpha_carries_opacity() {
        let red = color(0xFF, 0, 0, None);
        assert_eq!(enc(red, rgb(16, AlphaMode::Pixel)), 0x3F00_F800);
        let half = color(0xFF, 0, 0, Some(0x80));
        assert_eq!(enc(half, rgb(16, AlphaMode::Pixel)), 0x2000_F800);
    }

    #[test]
    fn rgb888_places_red_lowest() {
        let c = color(0x12, 0x34, 0x56, None);
        assert_eq!(enc(c, rgb(32, AlphaMode::Layer)), 0x0056_3412);
        let c = color(0x12, 0x34, 0x56, Some(0x80));
        assert_eq!(enc(c, rgb(32, AlphaMode::Pixel)), 0x8056_3412);
    }

    #[test]
    fn only_low_byte_of_components_counts() {
        let wide = color(0xAB12, 0xCD34, 0xEF56, None);
        let narrow = color(0x12, 0x34, 0x56, None);
        assert_eq!(
            enc(wide, rgb(32, AlphaMode::Layer)),
            enc(narrow, rgb(32, AlphaMode::Layer))
        );
    }
}

// ============================================================================
// Palette (CLUT) layers
// ============================================================================

mod clut_tests {
    use super::*;

    #[test]
    fn clut16_entry_layout() {
        assert_eq!(enc(WHITE, rgb(8, AlphaMode::Clut16)), 0x3FF8_FCF8);
        assert_eq!(enc(BLACK, rgb(8, AlphaMode::Clut16)), 0x3F00_0000);
    }

    #[test]
    fn clut32_entry_layout() {
        let c = color(0x12, 0x34, 0x56, Some(0x40));
        assert_eq!(enc(c, rgb(8, AlphaMode::Clut32)), 0x4012_3456);
    }

    #[test]
    fn map_targets_hardware_palette() {
        let red = [0xFF, 0x00];
        let green = [0x00, 0xFF];
        let blue = [0x00, 0x00];
        let map = ColorMap {
            red: &red,
            green: &green,
            blue: &blue,
            transp: None,
        };
        let encoded = encode(
            &map,
            16,
            &rgb(8, AlphaMode::Clut32),
            DisplayInterface::Parallel,
        )
        .unwrap();
        assert_eq!(encoded.target, PaletteTarget::Clut);
        assert_eq!(encoded.start, 16);
        assert_eq!(encoded.values, vec![0xFFFF_0000, 0xFF00_FF00]);
    }

    #[test]
    fn full_palette_fits_exactly() {
        let zeros = [0u16; 256];
        let map = ColorMap {
            red: &zeros,
            green: &zeros,
            blue: &zeros,
            transp: None,
        };
        let format = rgb(8, AlphaMode::Clut32);
        assert!(encode(&map, 0, &format, DisplayInterface::Parallel).is_ok());
        assert!(matches!(
            encode(&map, 1, &format, DisplayInterface::Parallel),
            Err(LogicvcError::PaletteRange {
                start: 1,
                end: 257,
                capacity: 256
            })
        ));
    }

    #[test]
    fn ragged_map_is_rejected() {
        let map = ColorMap {
            red: &[0, 0],
            green: &[0],
            blue: &[0, 0],
            transp: None,
        };
        assert!(matches!(
            encode(&map, 0, &rgb(8, AlphaMode::Clut32), DisplayInterface::Parallel),
            Err(LogicvcError::InvalidArgument(_))
        ));
    }
}

// ============================================================================
// YCbCr layers
// ============================================================================

mod yuv_tests {
    use super::*;

    #[test]
    fn full_range_black_and_white() {
        assert_eq!(rgb_to_ycbcr(0, 0, 0, &FULL_RANGE), (0, 128, 128));
        assert_eq!(rgb_to_ycbcr(0xFF, 0xFF, 0xFF, &FULL_RANGE), (255, 127, 128));
    }

    #[test]
    fn studio_range_lifts_luma() {
        let (y, _, _) = rgb_to_ycbcr(0, 0, 0, &ITU656);
        assert_eq!(y, 16);
    }

    #[test]
    fn ayuv_entries_depend_on_interface() {
        let format = ayuv();
        assert_eq!(
            encode_color(BLACK, &format, DisplayInterface::Parallel).unwrap(),
            0xFF00_8080
        );
        assert_eq!(
            encode_color(BLACK, &format, DisplayInterface::Itu656).unwrap(),
            0xFF10_8080
        );
        let clear = color(0, 0, 0, Some(0x20));
        assert_eq!(
            encode_color(clear, &format, DisplayInterface::Dvi).unwrap(),
            0x2000_8080
        );
    }

    #[test]
    fn packed_yuv_has_no_color_path() {
        let vyuy = PixelFormat {
            bpp: 16,
            bpp_virt: 16,
            ..ayuv()
        };
        assert!(matches!(
            encode_color(BLACK, &vyuy, DisplayInterface::Parallel),
            Err(LogicvcError::UnsupportedFormat)
        ));
    }
}

// ============================================================================
// Component layouts
// ============================================================================

mod layout_tests {
    use super::*;

    const RGB_LAYOUTS: [(u32, AlphaMode); 8] = [
        (8, AlphaMode::Layer),
        (8, AlphaMode::Pixel),
        (8, AlphaMode::Clut16),
        (8, AlphaMode::Clut32),
        (16, AlphaMode::Layer),
        (16, AlphaMode::Pixel),
        (32, AlphaMode::Layer),
        (32, AlphaMode::Pixel),
    ];

    const SAMPLES: [Color; 4] = [
        color(0xFF, 0xFF, 0xFF, None),
        color(0x12, 0xA5, 0x7E, Some(0x40)),
        color(0x80, 0x00, 0xC3, Some(0xFF)),
        color(0x01, 0xFE, 0x33, Some(0x00)),
    ];

    #[test]
    fn every_component_reads_back_through_its_field() {
        for (bpp_virt, alpha_mode) in RGB_LAYOUTS {
            let format = rgb(bpp_virt, alpha_mode);
            let layout = format.layout();
            for sample in SAMPLES {
                let value = enc(sample, format);
                let case = format!("{bpp_virt} bpp {alpha_mode:?} {sample:?} -> {value:#010x}");
                assert_eq!(
                    layout.red.extract(value),
                    narrow(sample.red, layout.red.length),
                    "red, {case}"
                );
                assert_eq!(
                    layout.green.extract(value),
                    narrow(sample.green, layout.green.length),
                    "green, {case}"
                );
                assert_eq!(
                    layout.blue.extract(value),
                    narrow(sample.blue, layout.blue.length),
                    "blue, {case}"
                );
                let transp = sample
                    .transp
                    .map_or(layout.transp.max(), |t| narrow(t, layout.transp.length));
                assert_eq!(layout.transp.extract(value), transp, "transp, {case}");
            }
        }
    }

    #[test]
    fn fields_do_not_overlap() {
        for (bpp_virt, alpha_mode) in RGB_LAYOUTS {
            let layout = rgb(bpp_virt, alpha_mode).layout();
            let fields = [layout.red, layout.green, layout.blue, layout.transp];
            for (i, a) in fields.iter().enumerate() {
                for b in &fields[i + 1..] {
                    assert_eq!(a.mask() & b.mask(), 0, "{bpp_virt} bpp {alpha_mode:?}");
                }
            }
        }
    }
}
