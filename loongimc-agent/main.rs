use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use loongimc::common::{select_topology, AffinityGuard, MemHandle, NativeCpu, Topology};
use loongimc::config::parse_register_value;
use loongimc::{ImcInfo, ImcMetricExporter, ImcProbe, ProbeConfig, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable summary
    Text,
    /// Prometheus text exposition format
    Prometheus,
}

#[derive(Parser, Debug)]
#[command(name = "loongimc")]
#[command(about = "Report DRAM timings and memory clock of Loongson LoongArch memory controllers")]
struct Args {
    #[arg(
        long,
        help = "CPU brand string (default: Model Name from /proc/cpuinfo), e.g. Loongson-3A5000"
    )]
    brand: Option<String>,

    #[arg(long, default_value_t = 0, help = "CPU to pin the probe to")]
    cpu: i32,

    #[arg(
        long,
        help = "Physical memory device (default: /dev/mem, /host/dev/mem when DOCKER_RUNNING is set)"
    )]
    mem_device: Option<PathBuf>,

    #[arg(
        long,
        value_parser = parse_clock_conf,
        help = "Memory PLL configuration word (IOCSR 0x1C0), needed for the frequency in user space"
    )]
    mem_clock_conf: Option<u32>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text, help = "Output format")]
    format: OutputFormat,

    #[arg(
        short,
        long,
        help = "Enable verbose logging (shows all register reads/writes)"
    )]
    verbose: bool,
}

fn parse_clock_conf(s: &str) -> std::result::Result<u32, String> {
    parse_register_value(s).map_err(|e| e.to_string())
}

fn check_permissions(mem_device: &Path) {
    if std::fs::metadata(mem_device).is_err() {
        eprintln!(
            "\n⚠️  ERROR: Cannot access {}\n\nThe kernel may be built without /dev/mem support.\n",
            mem_device.display()
        );
        std::process::exit(1);
    }

    // SAFETY: geteuid has no preconditions
    if unsafe { libc::geteuid() } != 0 {
        eprintln!(
            "\n⚠️  ERROR: {} requires root\n\nRun with: sudo loongimc\n",
            mem_device.display()
        );
        std::process::exit(1);
    }
}

fn print_report(config: &ProbeConfig, topology: Topology, info: &ImcInfo) {
    println!("CPU         : {}", config.brand);
    println!(
        "Topology    : {:?}, {} channel(s)",
        topology.mode, topology.max_channels
    );
    println!("Memory type : {}", info.kind);

    let Some(channel) = info.channel else {
        println!("Controller  : no channel responded");
        return;
    };

    println!("Channel     : {channel}");
    println!(
        "Timings     : CL{}-{}-{}-{} (tCL-tRCD-tRP-tRAS)",
        info.tcl, info.trcd, info.trp, info.tras
    );

    if info.width == 0 {
        println!("Bus width   : unknown");
    } else {
        println!("Bus width   : {} bit", info.width);
    }

    if info.freq == 0 {
        println!("Frequency   : undetermined");
    } else {
        println!("Frequency   : {} MHz", info.freq);
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging based on verbose flag, RUST_LOG wins when set
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ProbeConfig::resolve(args.brand, args.cpu, args.mem_device, args.mem_clock_conf)?;

    // Refuse unknown CPUs before touching any register
    let (family, topology) = select_topology(&config.brand)?;

    check_permissions(&config.mem_device);

    let cpu = match config.mem_clock_conf {
        Some(value) => NativeCpu::with_mem_clock_conf(value),
        None => {
            tracing::warn!("No --mem-clock-conf given; IOCSR is not readable from user space");
            NativeCpu::user()
        }
    };

    let probe = ImcProbe::new(MemHandle::open(&config.mem_device)?, cpu, topology);
    let info = {
        let _affinity = AffinityGuard::new(config.cpu)?;
        probe.run()?
    };

    match args.format {
        OutputFormat::Text => print_report(&config, probe.topology(), &info),
        OutputFormat::Prometheus => {
            let exporter = ImcMetricExporter::new(family, info.channel, &config.instance_label)?;
            exporter.update(&info);
            print!("{}", exporter.encode()?);
        }
    }

    Ok(())
}
