//! Integration tests for the device state machine over mock hardware.
//!
//! Checks bring-up programming, layer reference counting, mode changes,
//! blanking, panning, palettes, the control surface and vsync handling.

mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use common::*;
use logicvc_core::edid::EdidDisplay;
use logicvc_core::{
    AlphaMode, BackgroundConfig, BlankMode, Color, ColorMap, Device, DeviceConfig, DeviceEvent,
    DeviceState, FillRect, LayerColor, LayerGeometry, LayerType, LogicvcError,
};
use logicvc_core::timing::{FoundMode, ModeDb, ModeLookup, VideoMode, VmodeFlags};
use logicvc_registers::map::{clut_base, common as common_regs, layer as layer_regs, layer_base, vtc};

const L0: u32 = 0x100;

fn l0(reg: u32) -> u32 {
    layer_base(0) + reg
}

// ============================================================================
// Bring-up
// ============================================================================

mod bring_up_tests {
    use super::*;

    #[test]
    fn programs_timing_of_default_mode() {
        let (device, h) = make_device();
        assert_eq!(device.state(), DeviceState::Ready);
        assert_eq!(device.current_mode().name.as_str(), "1024x768-16@60");

        let regs = &h.regs;
        assert_eq!(regs.last_write_to(common_regs::SHSY_FP), Some(23));
        assert_eq!(regs.last_write_to(common_regs::SHSY), Some(135));
        assert_eq!(regs.last_write_to(common_regs::SHSY_BP), Some(159));
        assert_eq!(regs.last_write_to(common_regs::SHSY_RES), Some(1023));
        assert_eq!(regs.last_write_to(common_regs::SVSY_FP), Some(2));
        assert_eq!(regs.last_write_to(common_regs::SVSY), Some(5));
        assert_eq!(regs.last_write_to(common_regs::SVSY_BP), Some(28));
        assert_eq!(regs.last_write_to(common_regs::SVSY_RES), Some(767));
        // both syncs active low
        assert_eq!(regs.last_write_to(common_regs::CTRL), Some(0x15));
    }

    #[test]
    fn powers_up_in_order_with_delays() {
        let (_device, h) = make_device();
        assert_eq!(
            h.regs.writes_to(common_regs::SPWRCTRL),
            vec![0x0, 0x2, 0xA, 0xB],
            "power off, VDD, signal, backlight"
        );
        assert_eq!(h.delay.total_ms(), 30);
    }

    #[test]
    fn initializes_layer_and_interrupt_registers() {
        let (device, h) = make_device();
        assert_eq!(h.regs.last_write_to(l0(layer_regs::TRANSP)), Some(0xF81F));
        assert_eq!(h.regs.last_write_to(l0(layer_regs::CTRL)), Some(0));
        // readable registers keep the hardware alpha
        assert_eq!(h.regs.last_write_to(l0(layer_regs::ALPHA)), None);
        let mask = h.regs.last_write_to(common_regs::INT_MASK).unwrap();
        assert_eq!(mask, 0xFFDF, "only vsync unmasked, got 0x{mask:04X}");
        assert!(!device.is_layer_on(0).unwrap());
    }

    #[test]
    fn write_only_registers_are_shadowed() {
        let (device, h) = build(&single_layer_config(false), false, false);
        assert_eq!(h.regs.last_write_to(l0(layer_regs::ALPHA)), Some(0xFF));
        assert_eq!(device.alpha(0).unwrap(), 0xFF);
        assert_eq!(device.transparent_color(0).unwrap(), 0xF81F);
        assert_eq!(device.read_register(common_regs::SHSY_RES).unwrap(), 1023);
    }

    #[test]
    fn external_timing_controller_is_programmed() {
        let (_device, h) = build(&single_layer_config(true), true, true);
        let vtc_regs = h.vtc.as_ref().unwrap();
        assert_eq!(vtc_regs.writes_to(vtc::CTL), vec![0x2, 0x7]);
        assert_eq!(vtc_regs.last_write_to(vtc::GASIZE), Some((768 << 16) | 1024));
        assert_eq!(vtc_regs.last_write_to(vtc::GHSIZE), Some(1344));
        assert_eq!(vtc_regs.last_write_to(vtc::GVSIZE), Some((806 << 16) | 806));
        assert_eq!(
            vtc_regs.last_write_to(vtc::GHSYNC),
            Some(((1024 + 24 + 136) << 16) | (1024 + 24))
        );
    }

    #[test]
    fn bad_description_touches_no_register() {
        let h = harness(true, false);
        let config = DeviceConfig {
            layers: Vec::new(),
            ..single_layer_config(true)
        };
        let result = Device::new(&config, h.resources(None), Box::new(h.lookup.clone()));
        assert!(matches!(result, Err(LogicvcError::Config(_))));
        assert!(h.regs.get_writes().is_empty());
    }

    #[test]
    fn failed_startup_negotiation_touches_no_register() {
        let h = harness(true, false);
        h.lookup.refuse(true);
        let result = Device::new(
            &single_layer_config(true),
            h.resources(None),
            Box::new(h.lookup.clone()),
        );
        assert!(matches!(result, Err(LogicvcError::ModeNotFound(_))));
        assert!(h.regs.get_writes().is_empty());
    }

    #[test]
    fn display_descriptor_selects_preferred_mode() {
        let display = Arc::new(EdidDisplay::new());
        display.publish(&edid_1280x720()).unwrap();
        let config = DeviceConfig {
            edid_vmode: true,
            ..single_layer_config(true)
        };
        let (device, h) = build_with_display(&config, Some(display));
        assert_eq!(device.current_mode().name.as_str(), "1280x720-16@60");
        assert_eq!(device.configured_mode().name.as_str(), "1280x720-16@60");
        assert_eq!(h.regs.last_write_to(common_regs::SHSY_RES), Some(1279));
        // positive syncs from the descriptor
        assert_eq!(h.regs.last_write_to(common_regs::CTRL), Some(0x1F));
        assert_eq!(device.layer_var(0).unwrap().xres, 1280);
    }

    #[test]
    fn display_type_packs_interface_and_color_space() {
        let config = DeviceConfig {
            interface: 5,
            color_space: 2,
            ..single_layer_config(true)
        };
        let (device, _h) = build(&config, true, false);
        assert_eq!(device.display_type().interface(), 5);
        assert_eq!(device.display_type().color_space(), 2);
    }
}

// ============================================================================
// Open / release / remove
// ============================================================================

mod open_release_tests {
    use super::*;

    #[test]
    fn first_open_enables_last_release_disables() {
        let (device, h) = make_device();
        device.open(0).unwrap();
        device.open(0).unwrap();
        assert_eq!(h.regs.writes_to(l0(layer_regs::CTRL)).last(), Some(&1));
        assert_eq!(device.layer_use_count(0).unwrap(), 2);
        assert_eq!(device.use_count(), 2);

        h.regs.clear_writes();
        device.release(0).unwrap();
        assert!(h.regs.get_writes().is_empty());
        device.release(0).unwrap();
        assert_eq!(h.regs.last_write_to(l0(layer_regs::CTRL)), Some(0));
        assert_eq!(device.use_count(), 0);
    }

    #[test]
    fn release_without_open_is_rejected() {
        let (device, _h) = make_device();
        assert!(matches!(device.release(0), Err(LogicvcError::NotOpen(0))));
        assert!(matches!(device.open(3), Err(LogicvcError::InvalidLayer(3))));
    }

    #[test]
    fn concurrent_open_release_balances() {
        let (device, _h) = make_device();
        let device = Arc::new(device);
        let workers: Vec<_> = (0..8)
            .map(|_| {
                let device = Arc::clone(&device);
                thread::spawn(move || {
                    for _ in 0..100 {
                        device.open(0).unwrap();
                        device.release(0).unwrap();
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }
        assert_eq!(device.use_count(), 0);
        assert_eq!(device.layer_use_count(0).unwrap(), 0);
        assert!(!device.is_layer_on(0).unwrap());
    }

    #[test]
    fn remove_refused_while_open() {
        let (device, h) = make_device();
        device.open(0).unwrap();
        let device = match device.remove() {
            Err((device, LogicvcError::InUse(1))) => device,
            Err((_, e)) => panic!("unexpected error {e}"),
            Ok(_) => panic!("remove must fail while a layer is open"),
        };
        device.release(0).unwrap();
        h.regs.clear_writes();
        let resources = match device.remove() {
            Ok(resources) => resources,
            Err((_, e)) => panic!("remove failed: {e}"),
        };
        assert!(resources.display.is_none());
        assert_eq!(h.regs.last_write_to(l0(layer_regs::CTRL)), Some(0));
    }
}

// ============================================================================
// Geometry and mode changes
// ============================================================================

mod geometry_tests {
    use super::*;

    #[test]
    fn same_resolution_writes_nothing() {
        let (device, h) = make_device();
        let mut var = device.layer_var(0).unwrap();
        var.yoffset = 100;
        h.regs.clear_writes();
        device.set_geometry(0, &var).unwrap();
        assert!(h.regs.get_writes().is_empty());
        assert_eq!(device.layer_var(0).unwrap().yoffset, 100);
    }

    #[test]
    fn check_geometry_widens_24_bit_requests() {
        let (device, _h) = make_device();
        let mut var = device.layer_var(0).unwrap();
        var.bits_per_pixel = 24;
        assert_eq!(device.check_geometry(0, &var).unwrap().bits_per_pixel, 32);
    }

    #[test]
    fn resolution_change_reprograms_output() {
        let (device, h) = make_device();
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        device.subscribe(Box::new(move |event| sink.lock().unwrap().push(event.clone())));
        device.open(0).unwrap();
        let lookups = h.lookup.calls();

        let mut var = device.layer_var(0).unwrap();
        var.xres = 800;
        var.yres = 600;
        h.regs.clear_writes();
        device.set_geometry(0, &var).unwrap();

        assert_eq!(h.lookup.calls(), lookups + 1);
        assert_eq!(h.regs.last_write_to(common_regs::SHSY_RES), Some(799));
        assert_eq!(h.regs.last_write_to(common_regs::SVSY_RES), Some(599));
        // layer switched off around the change and back on afterwards
        assert_eq!(h.regs.writes_to(l0(layer_regs::CTRL)), vec![0, 1]);
        assert_eq!(h.regs.writes_to(common_regs::SPWRCTRL), vec![0x0, 0x2, 0xA, 0xB]);
        assert_eq!(device.current_mode().name.as_str(), "800x600-16@60");
        assert_eq!(device.configured_mode().name.as_str(), "1024x768-16@60");
        let writes = h.regs.get_writes();
        let position = |offset: u32, value: u32| writes.iter().position(|w| *w == (offset, value));
        let output_off = position(common_regs::SPWRCTRL, 0).unwrap();
        let layer_off = position(l0(layer_regs::CTRL), 0).unwrap();
        let timing = position(common_regs::SHSY_RES, 799).unwrap();
        assert!(output_off < layer_off, "output off before the layer");
        assert!(layer_off < timing, "layer off before the new timing");
        let var = device.layer_var(0).unwrap();
        assert_eq!((var.xres, var.yres), (800, 600));
        assert_eq!(var.timing.xres, 800);

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 1);
        let DeviceEvent::ModeChanged { layer, mode } = &events[0];
        assert_eq!(*layer, 0);
        assert_eq!(mode.mode.xres, 800);
    }

    #[test]
    fn configured_resolution_is_reused_without_lookup() {
        let (device, h) = make_device();
        let mut var = device.layer_var(0).unwrap();
        var.xres = 800;
        var.yres = 600;
        device.set_geometry(0, &var).unwrap();
        let lookups = h.lookup.calls();

        var.xres = 1024;
        var.yres = 768;
        device.set_geometry(0, &var).unwrap();
        assert_eq!(h.lookup.calls(), lookups);
        assert_eq!(h.regs.last_write_to(common_regs::SHSY_RES), Some(1023));
        assert_eq!(device.current_mode().name.as_str(), "1024x768-16@60");
    }

    #[test]
    fn failed_negotiation_changes_nothing() {
        let (device, h) = make_device();
        let before = device.layer_var(0).unwrap();
        let mut var = before;
        var.xres = 800;
        var.yres = 600;
        h.lookup.refuse(true);
        h.regs.clear_writes();
        assert!(matches!(
            device.set_geometry(0, &var),
            Err(LogicvcError::ModeNotFound(_))
        ));
        assert!(h.regs.get_writes().is_empty());
        assert_eq!(device.layer_var(0).unwrap(), before);
        assert_eq!(device.current_mode().name.as_str(), "1024x768-16@60");
    }

    #[test]
    fn descriptor_mode_rejects_unadvertised_resolution() {
        let display = Arc::new(EdidDisplay::new());
        display.publish(&edid_1280x720()).unwrap();
        let config = DeviceConfig {
            edid_vmode: true,
            ..single_layer_config(true)
        };
        let (device, h) = build_with_display(&config, Some(display));
        let mut var = device.layer_var(0).unwrap();
        var.xres = 800;
        var.yres = 600;
        h.regs.clear_writes();
        assert!(device.set_geometry(0, &var).is_err());
        assert!(h.regs.get_writes().is_empty());
    }

    #[test]
    fn new_timing_reaches_every_layer() {
        let config = DeviceConfig {
            layers: vec![
                rgb_layer(0, 16, AlphaMode::Layer),
                rgb_layer(1024, 16, AlphaMode::Layer),
            ],
            ..single_layer_config(true)
        };
        let (device, _h) = build(&config, true, false);
        let mut var = device.layer_var(1).unwrap();
        var.xres = 800;
        var.yres = 600;
        device.set_geometry(1, &var).unwrap();
        for index in 0..2 {
            let var = device.layer_var(index).unwrap();
            assert_eq!((var.xres, var.yres), (800, 600), "layer {index}");
        }
    }
}

// ============================================================================
// Blanking
// ============================================================================

mod blank_tests {
    use super::*;

    #[test]
    fn powerdown_and_unblank_toggle_signal() {
        let (device, h) = make_device();
        let before = h.delay.total_ms();
        device.blank(0, BlankMode::Powerdown).unwrap();
        assert_eq!(h.regs.last_write_to(common_regs::SPWRCTRL), Some(0x3));
        device.blank(0, BlankMode::Unblank).unwrap();
        assert_eq!(h.regs.last_write_to(common_regs::SPWRCTRL), Some(0xB));
        assert_eq!(h.delay.total_ms(), before + 100);
    }

    #[test]
    fn powerdown_uses_shadow_on_write_only_registers() {
        let (device, h) = build(&single_layer_config(false), false, false);
        device.blank(0, BlankMode::Powerdown).unwrap();
        assert_eq!(h.regs.last_write_to(common_regs::SPWRCTRL), Some(0x3));
    }

    #[test]
    fn sync_suspend_levels_are_rejected() {
        let (device, h) = make_device();
        h.regs.clear_writes();
        for mode in [BlankMode::VSyncSuspend, BlankMode::HSyncSuspend] {
            assert!(matches!(
                device.blank(0, mode),
                Err(LogicvcError::UnsupportedBlank(m)) if m == mode
            ));
        }
        assert!(h.regs.get_writes().is_empty());
    }

    #[test]
    fn normal_blank_fills_visible_window() {
        let (device, h) = make_device();
        h.vmem.bytes.lock().unwrap().fill(0xFF);
        device.blank(0, BlankMode::Normal).unwrap();
        let stride = 2048;
        assert_eq!(h.vmem.u16_at(0), 0);
        assert_eq!(h.vmem.u16_at(767 * stride + 2046), 0);
        // first line below the visible window is untouched
        assert_eq!(h.vmem.u16_at(768 * stride), 0xFFFF);
    }

    #[test]
    fn normal_blank_on_palette_layer_programs_black_entry() {
        let config = DeviceConfig {
            layers: vec![rgb_layer(0, 8, AlphaMode::Clut32)],
            ..single_layer_config(true)
        };
        let (device, h) = build(&config, true, false);
        h.vmem.bytes.lock().unwrap().fill(0x55);
        device.blank(0, BlankMode::Normal).unwrap();
        assert_eq!(h.regs.last_write_to(clut_base(0, 0)), Some(0xFF00_0000));
        assert_eq!(h.vmem.u8_at(0), 0);
        assert_eq!(h.vmem.u8_at(767 * 1024 + 1023), 0);
    }
}

// ============================================================================
// Panning
// ============================================================================

mod pan_tests {
    use super::*;

    #[test]
    fn pan_programs_offsets_and_window() {
        let (device, h) = make_device();
        h.regs.clear_writes();
        device.pan(0, 0, 768).unwrap();
        assert_eq!(h.regs.last_write_to(L0 + layer_regs::HOR_OFF), Some(0));
        assert_eq!(h.regs.last_write_to(L0 + layer_regs::VER_OFF), Some(768));
        assert_eq!(h.regs.last_write_to(L0 + layer_regs::HOR_POS), Some(1023));
        assert_eq!(h.regs.last_write_to(L0 + layer_regs::VER_POS), Some(767));
        assert_eq!(device.layer_var(0).unwrap().yoffset, 768);
    }

    #[test]
    fn unchanged_offsets_write_nothing() {
        let (device, h) = make_device();
        h.regs.clear_writes();
        device.pan(0, 0, 0).unwrap();
        assert!(h.regs.get_writes().is_empty());
    }

    #[test]
    fn pan_past_layer_memory_is_rejected() {
        let (device, h) = make_device();
        h.regs.clear_writes();
        assert!(matches!(
            device.pan(0, 0, 1400),
            Err(LogicvcError::PanOutOfRange { x: 0, y: 1400 })
        ));
        assert!(h.regs.get_writes().is_empty());
        assert_eq!(device.layer_var(0).unwrap().yoffset, 0);
    }

    #[test]
    fn ywrap_is_rejected() {
        let (device, h) = make_device();
        let mut var = device.layer_var(0).unwrap();
        var.timing.vmode = VmodeFlags::YWRAP;
        device.set_geometry(0, &var).unwrap();
        h.regs.clear_writes();
        assert!(matches!(device.pan(0, 0, 8), Err(LogicvcError::PanWrap)));
        assert!(h.regs.get_writes().is_empty());
    }

    #[test]
    fn ycbcr_422_pans_to_even_columns() {
        let config = DeviceConfig {
            layers: vec![logicvc_core::LayerConfig {
                layer_type: LayerType::YCbCr.bits(),
                row_stride: 2048,
                ..rgb_layer(0, 16, AlphaMode::Layer)
            }],
            ..single_layer_config(true)
        };
        let (device, h) = build(&config, true, false);
        device.pan(0, 5, 0).unwrap();
        assert_eq!(h.regs.last_write_to(L0 + layer_regs::HOR_OFF), Some(4));
        assert_eq!(device.layer_var(0).unwrap().xoffset, 4);
    }
}

// ============================================================================
// Palettes and fills
// ============================================================================

mod palette_tests {
    use super::*;

    #[test]
    fn truecolor_map_feeds_fill() {
        let (device, h) = make_device();
        let map = ColorMap {
            red: &[0xFF],
            green: &[0x00],
            blue: &[0x00],
            transp: None,
        };
        h.regs.clear_writes();
        device.set_cmap(0, &map, 1).unwrap();
        // pseudo palette lives in memory, not in registers
        assert!(h.regs.get_writes().is_empty());

        let rect = FillRect {
            x: 1,
            y: 2,
            width: 2,
            height: 1,
            color: 1,
        };
        device.fill_rect(0, rect).unwrap();
        let row = 2 * 2048;
        assert_eq!(h.vmem.u16_at(row), 0);
        assert_eq!(h.vmem.u16_at(row + 2), 0xF800);
        assert_eq!(h.vmem.u16_at(row + 4), 0xF800);
        assert_eq!(h.vmem.u16_at(row + 6), 0);
    }

    #[test]
    fn palette_run_past_end_is_rejected() {
        let (device, h) = make_device();
        let zeros = [0u16; 10];
        let map = ColorMap {
            red: &zeros,
            green: &zeros,
            blue: &zeros,
            transp: None,
        };
        h.regs.clear_writes();
        assert!(matches!(
            device.set_cmap(0, &map, 250),
            Err(LogicvcError::PaletteRange {
                start: 250,
                end: 260,
                capacity: 256
            })
        ));
        assert!(h.regs.get_writes().is_empty());
    }

    #[test]
    fn palette_layer_writes_hardware_entries() {
        let config = DeviceConfig {
            layers: vec![rgb_layer(0, 8, AlphaMode::Clut32)],
            ..single_layer_config(true)
        };
        let (device, h) = build(&config, true, false);
        let color = Color {
            red: 0x12,
            green: 0x34,
            blue: 0x56,
            transp: None,
        };
        device.set_color_reg(0, 3, color).unwrap();
        assert_eq!(h.regs.last_write_to(clut_base(0, 0) + 3 * 8), Some(0xFF12_3456));
        assert_eq!(
            device.read_register(clut_base(0, 0) + 3 * 8).unwrap(),
            0xFF12_3456
        );
    }

    #[test]
    fn alpha_layer_has_no_color_path() {
        let config = DeviceConfig {
            layers: vec![logicvc_core::LayerConfig {
                layer_type: LayerType::Alpha.bits(),
                ..rgb_layer(0, 8, AlphaMode::Layer)
            }],
            ..single_layer_config(true)
        };
        let (device, _h) = build(&config, true, false);
        assert!(matches!(
            device.set_color_reg(0, 0, Color::default()),
            Err(LogicvcError::UnsupportedFormat)
        ));
    }
}

// ============================================================================
// Control surface
// ============================================================================

mod control_tests {
    use super::*;

    #[test]
    fn alpha_round_trip() {
        let (device, h) = make_device();
        device.set_alpha(0, 0x80).unwrap();
        assert_eq!(h.regs.last_write_to(L0 + layer_regs::ALPHA), Some(0x80));
        assert_eq!(device.alpha(0).unwrap(), 0x80);
    }

    #[test]
    fn color_transparency_toggles_control_bit() {
        let (device, h) = make_device();
        device.set_color_transparency(0, false).unwrap();
        assert_eq!(h.regs.last_write_to(L0 + layer_regs::CTRL), Some(0x2));
        device.set_color_transparency(0, true).unwrap();
        assert_eq!(h.regs.last_write_to(L0 + layer_regs::CTRL), Some(0x0));
    }

    #[test]
    fn transparent_color_is_converted() {
        let (device, h) = make_device();
        device
            .set_transparent_color(0, LayerColor::rgb(0xFF, 0x00, 0xFF))
            .unwrap();
        assert_eq!(h.regs.last_write_to(L0 + layer_regs::TRANSP), Some(0xF81F));
        device.set_transparent_color(0, LayerColor::raw(0x1234)).unwrap();
        assert_eq!(device.transparent_color(0).unwrap(), 0x1234);
    }

    #[test]
    fn size_position_round_trip() {
        let (device, h) = make_device();
        let geometry = LayerGeometry {
            x: 10,
            y: 20,
            width: 100,
            height: 50,
        };
        device.set_size_position(0, geometry).unwrap();
        assert_eq!(h.regs.last_write_to(L0 + layer_regs::WIDTH), Some(99));
        assert_eq!(h.regs.last_write_to(L0 + layer_regs::HEIGHT), Some(49));
        assert_eq!(h.regs.last_write_to(L0 + layer_regs::HOR_POS), Some(109));
        assert_eq!(h.regs.last_write_to(L0 + layer_regs::VER_POS), Some(69));
        assert_eq!(device.size_position(0).unwrap(), geometry);
    }

    #[test]
    fn size_position_outside_output_is_rejected() {
        let (device, h) = make_device();
        h.regs.clear_writes();
        let geometry = LayerGeometry {
            x: 1000,
            y: 0,
            width: 100,
            height: 10,
        };
        assert!(matches!(
            device.set_size_position(0, geometry),
            Err(LogicvcError::InvalidArgument(_))
        ));
        assert!(h.regs.get_writes().is_empty());
    }

    #[test]
    fn active_buffer_selects_vertical_offset() {
        let (device, h) = make_device();
        assert_eq!(device.buffer_count(0).unwrap(), 2);
        assert_eq!(device.buffer_offset(0).unwrap(), 768);
        device.set_active_buffer(0, 1).unwrap();
        assert_eq!(h.regs.last_write_to(L0 + layer_regs::VER_OFF), Some(768));
        assert_eq!(device.active_buffer(0).unwrap(), 1);
        assert!(matches!(
            device.set_active_buffer(0, 2),
            Err(LogicvcError::InvalidArgument(_))
        ));
    }

    #[test]
    fn background_color_needs_background_layer() {
        let (device, _h) = make_device();
        assert!(matches!(
            device.background_color(),
            Err(LogicvcError::InvalidArgument(_))
        ));

        let config = DeviceConfig {
            background: Some(BackgroundConfig {
                data_width: 16,
                alpha_mode: AlphaMode::Layer.bits(),
            }),
            ..single_layer_config(true)
        };
        let (device, h) = build(&config, true, false);
        device
            .set_background_color(LayerColor::rgb(0xFF, 0xFF, 0xFF))
            .unwrap();
        assert_eq!(h.regs.last_write_to(common_regs::BACKGROUND), Some(0xFFFF));
        assert_eq!(device.background_color().unwrap(), 0xFFFF);
    }

    #[test]
    fn raw_register_access_decodes_blocks() {
        let (device, h) = build(&single_layer_config(false), false, false);
        device.write_register(L0 + layer_regs::ALPHA, 7).unwrap();
        assert_eq!(h.regs.last_write_to(L0 + layer_regs::ALPHA), Some(7));
        // write-only window: the value comes back from the shadow
        assert_eq!(device.read_register(L0 + layer_regs::ALPHA).unwrap(), 7);
        assert!(matches!(
            device.read_register(0x7000),
            Err(LogicvcError::RegisterOffset(0x7000))
        ));
        // layer 3 is not fitted
        let absent = layer_base(3);
        assert!(matches!(
            device.write_register(absent, 1),
            Err(LogicvcError::RegisterOffset(o)) if o == absent
        ));
    }

    #[test]
    fn display_descriptor_wait_and_read() {
        let (device, _h) = make_device();
        assert!(matches!(device.display_descriptor(), Err(LogicvcError::NoDisplay)));
        assert!(matches!(
            device.wait_display_descriptor(Duration::from_millis(20)),
            Err(LogicvcError::Timeout(_))
        ));

        let display = Arc::new(EdidDisplay::new());
        device.attach_display(display.clone());
        let publisher = {
            let display = Arc::clone(&display);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20));
                display.publish(&edid_1280x720()).unwrap();
            })
        };
        device
            .wait_display_descriptor(Duration::from_secs(5))
            .unwrap();
        publisher.join().unwrap();
        let raw = device.display_descriptor().unwrap();
        assert_eq!(raw[..8], [0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x00]);
    }

    #[test]
    fn layer_index_and_plan() {
        let (device, _h) = make_device();
        assert_eq!(device.layer_index(0).unwrap(), 0);
        let plan = device.layer_plan(0).unwrap();
        assert_eq!(plan.address, POOL_BASE);
        assert_eq!(plan.height, 2048);
        assert!(matches!(device.layer_index(1), Err(LogicvcError::InvalidLayer(1))));
    }
}

// ============================================================================
// Vsync
// ============================================================================

mod vsync_tests {
    use super::*;

    /// Lookup that holds a mode change inside negotiation until resumed.
    struct ParkingLookup {
        armed: Arc<AtomicBool>,
        parked: Mutex<mpsc::Sender<()>>,
        resume: Mutex<mpsc::Receiver<()>>,
    }

    impl ModeLookup for ParkingLookup {
        fn find_mode(
            &self,
            name: Option<&str>,
            db: &[VideoMode],
            default: Option<&VideoMode>,
            bpp: u32,
        ) -> Option<FoundMode> {
            if self.armed.swap(false, Ordering::SeqCst) {
                let _ = self.parked.lock().unwrap().send(());
                let _ = self
                    .resume
                    .lock()
                    .unwrap()
                    .recv_timeout(Duration::from_secs(5));
            }
            ModeDb.find_mode(name, db, default, bpp)
        }
    }

    #[test]
    fn interrupt_is_serviced_during_a_mode_change() {
        let h = harness(true, false);
        let armed = Arc::new(AtomicBool::new(false));
        let (parked_tx, parked_rx) = mpsc::channel();
        let (resume_tx, resume_rx) = mpsc::channel();
        let lookup = ParkingLookup {
            armed: Arc::clone(&armed),
            parked: Mutex::new(parked_tx),
            resume: Mutex::new(resume_rx),
        };
        let device = Arc::new(
            Device::new(&single_layer_config(true), h.resources(None), Box::new(lookup)).unwrap(),
        );

        armed.store(true, Ordering::SeqCst);
        let changer = {
            let device = Arc::clone(&device);
            thread::spawn(move || {
                let mut var = device.layer_var(0).unwrap();
                var.xres = 800;
                var.yres = 600;
                device.set_geometry(0, &var)
            })
        };
        // the mode change now holds the layer and common locks
        parked_rx.recv_timeout(Duration::from_secs(5)).unwrap();

        h.regs.set_value(common_regs::INT_STAT, 1 << 5);
        let (done_tx, done_rx) = mpsc::channel();
        let irq = {
            let device = Arc::clone(&device);
            thread::spawn(move || {
                let _ = done_tx.send(device.handle_interrupt());
            })
        };
        let serviced = done_rx.recv_timeout(Duration::from_secs(2));
        resume_tx.send(()).unwrap();
        changer.join().unwrap().unwrap();
        irq.join().unwrap();

        assert_eq!(serviced, Ok(true));
        assert_eq!(device.vsync_count(), 1);
        assert_eq!(device.current_mode().name.as_str(), "800x600-16@60");
    }

    #[test]
    fn interrupt_acknowledges_vsync() {
        let (device, h) = make_device();
        assert!(!device.handle_interrupt());
        h.regs.set_value(common_regs::INT_STAT, 1 << 5);
        assert!(device.handle_interrupt());
        assert_eq!(h.regs.last_write_to(common_regs::INT_STAT), Some(1 << 5));
        assert_eq!(device.vsync_count(), 1);
        // acknowledged: nothing pending any more
        assert!(!device.handle_interrupt());
    }

    #[test]
    fn waiter_wakes_on_vsync() {
        let (device, h) = make_device();
        let device = Arc::new(device);
        let irq = {
            let device = Arc::clone(&device);
            let regs = h.regs.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20));
                regs.set_value(common_regs::INT_STAT, 1 << 5);
                device.handle_interrupt();
            })
        };
        assert_eq!(device.wait_for_vsync(Duration::from_secs(5)).unwrap(), 1);
        irq.join().unwrap();
    }

    #[test]
    fn wait_times_out_without_vsync() {
        let (device, _h) = make_device();
        assert!(matches!(
            device.wait_for_vsync(Duration::from_millis(10)),
            Err(LogicvcError::Timeout("vsync"))
        ));
    }
}
