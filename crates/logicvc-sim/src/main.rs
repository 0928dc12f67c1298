//! Host-side simulator for the logiCVC compositor driver.
//!
//! Loads a TOML device description, brings the driver up against in-memory
//! register windows and video memory, and reports what it planned,
//! negotiated and programmed.
//!
//! ```bash
//! logicvc-sim plan configs/two_layers.toml
//! logicvc-sim mode configs/two_layers.toml --resolution 800x600
//! logicvc-sim palette configs/clut_layer.toml --layer 0 FF0000 80123456
//! logicvc-sim regs configs/two_layers.toml --edid monitor.bin
//! ```

mod config;
mod platform;
mod report;

use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use logicvc_core::color::{encode, Color, ColorMap, PixelFormat};
use logicvc_core::edid::{DisplayDescriptor, EdidDisplay};
use logicvc_core::planner;
use logicvc_core::timing::hw::{TimingRegisters, VtcTimings};
use logicvc_core::timing::ModeDb;
use logicvc_core::{Device, DeviceConfig, Resources};

use platform::{SimDelay, SimMemory, SimRegisters};

/// Largest video memory pool the simulator allocates.
const MAX_SIM_POOL: u64 = 256 * 1024 * 1024;

type SimDevice = Device<SimRegisters, SimMemory, SimDelay>;

#[derive(Parser)]
#[command(name = "logicvc-sim")]
#[command(about = "Run the logiCVC driver against simulated hardware", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Suppress driver logging (only show errors)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show where each layer is placed in the video memory pool
    Plan {
        /// Device description (TOML)
        config: PathBuf,
    },
    /// Bring the device up and show the negotiated video mode
    Mode {
        /// Device description (TOML)
        config: PathBuf,

        /// EDID file published as the attached display's descriptor
        #[arg(long)]
        edid: Option<PathBuf>,

        /// Resolution to switch the active layer to, e.g. 800x600
        #[arg(short, long)]
        resolution: Option<String>,

        /// Bits per pixel requested together with --resolution
        #[arg(long)]
        bpp: Option<u32>,
    },
    /// Encode colors for a layer's palette
    Palette {
        /// Device description (TOML)
        config: PathBuf,

        /// Layer index
        #[arg(short, long, default_value = "0")]
        layer: usize,

        /// First palette index
        #[arg(short, long, default_value = "0")]
        start: usize,

        /// Colors as RRGGBB or AARRGGBB hex
        #[arg(required = true)]
        colors: Vec<String>,
    },
    /// Bring the device up and dump every register it wrote
    Regs {
        /// Device description (TOML)
        config: PathBuf,

        /// EDID file published as the attached display's descriptor
        #[arg(long)]
        edid: Option<PathBuf>,

        /// Wait out the power sequencing delays instead of only counting them
        #[arg(long)]
        sleep: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    if !cli.quiet {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .parse_default_env()
            .init();
    }

    let result = match cli.command {
        Commands::Plan { config } => run_plan(&config),
        Commands::Mode {
            config,
            edid,
            resolution,
            bpp,
        } => run_mode(&config, edid.as_deref(), resolution.as_deref(), bpp),
        Commands::Palette {
            config,
            layer,
            start,
            colors,
        } => run_palette(&config, layer, start, &colors),
        Commands::Regs {
            config,
            edid,
            sleep,
        } => run_regs(&config, edid.as_deref(), sleep),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn load_edid(path: &Path) -> Result<Arc<dyn DisplayDescriptor>> {
    let bytes =
        fs::read(path).with_context(|| format!("failed to read EDID {}", path.display()))?;
    let display = EdidDisplay::new();
    display
        .publish(&bytes)
        .with_context(|| format!("unusable EDID {}", path.display()))?;
    Ok(Arc::new(display))
}

fn bring_up(config: &DeviceConfig, edid: Option<&Path>, sleep: bool) -> Result<SimDevice> {
    let pool = config.pool_high.saturating_sub(config.pool_base);
    if pool > MAX_SIM_POOL {
        bail!("video memory pool of {pool:#x} bytes is larger than the simulator allows");
    }
    let display = edid.map(load_edid).transpose()?;
    let resources = Resources {
        regs: SimRegisters::compositor(),
        vtc: config.vtc_base.map(|_| SimRegisters::timing_controller()),
        vmem: SimMemory::new(usize::try_from(pool)?),
        delay: SimDelay::new(sleep),
        display,
    };
    Device::new(config, resources, Box::new(ModeDb)).context("device bring-up failed")
}

fn run_plan(path: &Path) -> Result<()> {
    let config = config::load(path)?;
    let setup = config.normalize()?;
    let inputs: Vec<_> = setup.layers.iter().map(|l| l.plan_input()).collect();
    let plans = planner::plan(&inputs, setup.pool_base, setup.pool_high);

    println!(
        "pool {:#x}..{:#x} ({} KiB)",
        setup.pool_base,
        setup.pool_high,
        (setup.pool_high - setup.pool_base) / 1024
    );
    for (id, (layer, plan)) in setup.layers.iter().zip(&plans).enumerate() {
        println!(
            "layer {id}: {:?} {} bpp, stride {} px, {:#x}..{:#x}, {} lines, {} buffers of {} lines",
            layer.layer_type,
            layer.bpp,
            layer.width,
            plan.address,
            plan.address + plan.size,
            plan.height,
            plan.buffer_count(),
            layer.buffer_offset
        );
    }
    planner::validate(&inputs, &plans, setup.pool_base, setup.pool_high)
        .context("layer placement rejected")
}

fn parse_resolution(text: &str) -> Result<(u32, u32)> {
    let (x, y) = text
        .split_once('x')
        .with_context(|| format!("resolution {text:?} is not <width>x<height>"))?;
    Ok((
        x.parse().with_context(|| format!("bad width in {text:?}"))?,
        y.parse().with_context(|| format!("bad height in {text:?}"))?,
    ))
}

fn run_mode(
    path: &Path,
    edid: Option<&Path>,
    resolution: Option<&str>,
    bpp: Option<u32>,
) -> Result<()> {
    let config = config::load(path)?;
    let device = bring_up(&config, edid, false)?;

    if let Some(resolution) = resolution {
        let (xres, yres) = parse_resolution(resolution)?;
        let index = device.active_layer();
        let mut var = device.layer_var(index)?;
        var.xres = xres;
        var.yres = yres;
        if let Some(bpp) = bpp {
            var.bits_per_pixel = bpp;
        }
        device
            .set_geometry(index, &var)
            .with_context(|| format!("cannot switch to {resolution}"))?;
    }

    let current = device.current_mode();
    let mode = current.mode;
    println!("mode {}", current.name);
    println!(
        "  pixel clock {} kHz, refresh {} Hz",
        mode.pixclock_khz(),
        mode.refresh
    );
    println!(
        "  horizontal: {} active, {} front, {} sync, {} back",
        mode.xres, mode.right_margin, mode.hsync_len, mode.left_margin
    );
    println!(
        "  vertical:   {} active, {} front, {} sync, {} back",
        mode.yres, mode.lower_margin, mode.vsync_len, mode.upper_margin
    );
    println!(
        "  sync: hsync {}, vsync {}",
        if current.ctrl.hsync_high() { "high" } else { "low" },
        if current.ctrl.vsync_high() { "high" } else { "low" }
    );

    println!("timing registers:");
    let writes = TimingRegisters::new(&mode, current.ctrl).writes();
    for line in report::dump(writes, report::register_name) {
        println!("  {line}");
    }
    if config.vtc_base.is_some() {
        println!("timing controller:");
        let writes = VtcTimings::new(&mode, current.ctrl).writes();
        for line in report::dump(writes, report::vtc_register_name) {
            println!("  {line}");
        }
    }
    Ok(())
}

fn parse_color(text: &str) -> Result<Color> {
    let hex = text.trim_start_matches('#').trim_start_matches("0x");
    let value =
        u32::from_str_radix(hex, 16).with_context(|| format!("color {text:?} is not hex"))?;
    let transp = match hex.len() {
        6 => None,
        8 => Some((value >> 24) as u16),
        _ => bail!("color {text:?} must be RRGGBB or AARRGGBB"),
    };
    Ok(Color {
        red: (value >> 16 & 0xFF) as u16,
        green: (value >> 8 & 0xFF) as u16,
        blue: (value & 0xFF) as u16,
        transp,
    })
}

fn run_palette(path: &Path, index: usize, start: usize, colors: &[String]) -> Result<()> {
    let config = config::load(path)?;
    let setup = config.normalize()?;
    let Some(layer) = setup.layers.get(index) else {
        bail!("no layer {index}, the device has {}", setup.layers.len());
    };
    let format = PixelFormat {
        bpp: layer.bpp,
        bpp_virt: layer.bpp_virt,
        alpha_mode: layer.alpha_mode,
        layer_type: layer.layer_type,
        swap_rb: layer.swap_rb,
    };

    let colors = colors
        .iter()
        .map(|c| parse_color(c))
        .collect::<Result<Vec<_>>>()?;
    let red: Vec<u16> = colors.iter().map(|c| c.red).collect();
    let green: Vec<u16> = colors.iter().map(|c| c.green).collect();
    let blue: Vec<u16> = colors.iter().map(|c| c.blue).collect();
    let transp: Vec<u16> = colors.iter().map(|c| c.transp.unwrap_or(0xFF)).collect();
    let map = ColorMap {
        red: &red,
        green: &green,
        blue: &blue,
        transp: colors.iter().any(|c| c.transp.is_some()).then_some(&transp[..]),
    };

    let encoded = encode(&map, start, &format, setup.interface)?;
    println!(
        "layer {index}: {:?} {} bpp, {:?} alpha, {:?}",
        layer.layer_type, layer.bpp, layer.alpha_mode, encoded.target
    );
    for (i, value) in encoded.values.iter().enumerate() {
        println!("  [{:3}] {value:#010x}", encoded.start + i);
    }

    // the device must accept the same map
    let device = bring_up(&config, None, false)?;
    device.set_cmap(index, &map, start)?;
    info!("palette programmed on layer {index}");
    Ok(())
}

fn run_regs(path: &Path, edid: Option<&Path>, sleep: bool) -> Result<()> {
    let config = config::load(path)?;
    let device = bring_up(&config, edid, sleep)?;
    let mode = device.current_mode().name;
    let resources = device.remove().map_err(|(_, e)| e)?;

    println!("compositor registers after bring-up in {mode}:");
    for line in report::dump(resources.regs.written(), report::register_name) {
        println!("  {line}");
    }
    if let Some(vtc) = &resources.vtc {
        println!("timing controller registers:");
        for line in report::dump(vtc.written(), report::vtc_register_name) {
            println!("  {line}");
        }
    }
    println!(
        "power sequencing waited {} ms",
        resources.delay.elapsed().as_millis()
    );
    Ok(())
}
