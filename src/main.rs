use std::path::PathBuf;
use std::time::{Duration, Instant};

use ambience_mixer::audio_system::{
    AudioBackend, AudioManager, MockBackend, RodioBackend, SharedListener,
};
use ambience_mixer::manifest::{LoadedManifest, SoundManifest};
use ambience_mixer::messaging::MixerEvent;
use ambience_mixer::preferences::JsonPreferenceStore;
use ambience_mixer::sound::tone_wav;
use ambience_mixer::{
    AppResult, AreaTheme, Clip, MixerConfig, RandomSoundRule, SoundDescriptor, SoundRegistry,
    SoundRegistryEntry,
};
use anyhow::Context;
use glam::Vec3;
use rand::Rng;
use sysinfo::System;

const LOG_TARGET_STARTUP: &str = "ambience_mixer::startup";

const TICK: Duration = Duration::from_micros(16_667);
const RUN_SECONDS: f32 = 45.0;
const THEME_SECONDS: f32 = 12.0;
const STEP_SECONDS: f32 = 0.5;
const DUMP_AT: f32 = 18.0;

/// Initialize tracing with file rotation
///
/// Logs are written to the `AmbienceMixer/logs` folder of the platform config
/// directory, one file per day. Debug builds also log to the console.
fn initialize_tracing() {
    use tracing_appender::rolling;
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let log_dir = dirs::config_dir()
        .map(|dir| dir.join(ambience_mixer::config::APP_DIR_NAME).join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"));

    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Warning: Failed to create log directory: {}", e);
    }

    let file_appender = rolling::daily(&log_dir, "ambience-mixer.log");

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true);

    #[cfg(debug_assertions)]
    {
        let console_layer = fmt::layer()
            .with_writer(std::io::stdout)
            .with_target(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .with(console_layer)
            .init();
    }

    #[cfg(not(debug_assertions))]
    {
        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();
    }

    tracing::info!("Log directory: {}", log_dir.display());
}

fn log_runtime_environment() {
    let os_name = System::long_os_version()
        .or_else(System::name)
        .unwrap_or_else(|| "Unknown OS".to_string());
    let kernel = System::kernel_version().unwrap_or_else(|| "Unknown Kernel".to_string());

    tracing::info!(
        target: LOG_TARGET_STARTUP,
        "Starting ambience demo v{} on ({})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::ARCH
    );
    tracing::info!(target: LOG_TARGET_STARTUP, "Operating System: {} (kernel {})", os_name, kernel);
}

/// Synthesized registry and themes for running without a manifest
fn demo_content() -> AppResult<LoadedManifest> {
    let tone = |name: &str, frequency: f32, seconds: f32| -> AppResult<_> {
        let bytes = tone_wav(frequency, seconds, 22_050)
            .with_context(|| format!("Failed to synthesize {}", name))?;
        Ok(Clip::from_bytes(name, bytes)?.into_handle())
    };

    let registry = SoundRegistry::from_entries(vec![
        SoundRegistryEntry::new("Ambient/Indoor", "Ambient", vec![tone("indoor", 110.0, 3.0)?]),
        SoundRegistryEntry::new("Ambient/Outdoor", "Ambient", vec![tone("outdoor", 196.0, 3.0)?]),
        SoundRegistryEntry::new(
            "Birds/Chirp",
            "Birds",
            vec![tone("chirp-a", 1760.0, 0.2)?, tone("chirp-b", 2093.0, 0.2)?],
        ),
        SoundRegistryEntry::new(
            "Footsteps/Stone",
            "Footsteps",
            vec![tone("step-a", 90.0, 0.08)?, tone("step-b", 120.0, 0.08)?],
        ),
    ])?;

    let themes = vec![
        AreaTheme::new(SoundDescriptor::registered("Ambient/Indoor")).with_name("Indoor"),
        AreaTheme::new(SoundDescriptor::registered("Ambient/Outdoor"))
            .with_name("Outdoor")
            .with_base_volume(0.8)
            .with_random_sound(RandomSoundRule::new(
                SoundDescriptor::registered("Birds/Chirp"),
                10.0,
                14.0,
            )),
    ];

    Ok(LoadedManifest { registry, themes })
}

fn open_backend() -> Box<dyn AudioBackend> {
    match RodioBackend::try_default() {
        Ok(backend) => Box::new(backend),
        Err(e) => {
            tracing::warn!("No audio output ({}), running silent", e);
            Box::new(MockBackend::new())
        }
    }
}

fn main() -> AppResult<()> {
    initialize_tracing();
    log_runtime_environment();

    let config = MixerConfig::load().context("Failed to load mixer configuration")?;

    let LoadedManifest { registry, themes } = match std::env::args().nth(1) {
        Some(path) => SoundManifest::load(&PathBuf::from(path))?,
        None => demo_content()?,
    };
    let footstep = SoundDescriptor::registered("Footsteps/Stone");
    let has_footsteps = registry.is_playable(&footstep);
    let theme_names: Vec<String> = themes.iter().map(|t| t.name().to_string()).collect();

    let listener = SharedListener::new(Vec3::ZERO);
    let store = JsonPreferenceStore::open_default().context("Failed to open preferences")?;
    let mut manager = AudioManager::new(
        open_backend(),
        Box::new(listener.clone()),
        registry,
        config,
        Box::new(store),
    )
    .context("Invalid mixer configuration")?;
    manager.register_themes(themes)?;
    let (events, _) = manager.events().subscribe();

    let mut rng = rand::thread_rng();
    let mut elapsed = 0.0_f32;
    let mut next_step = 0.0_f32;
    let mut current_theme: Option<String> = None;
    let mut dumped = false;
    let dt = TICK.as_secs_f32();

    while elapsed < RUN_SECONDS {
        let frame_start = Instant::now();

        // Walk along +x and switch area every few seconds
        listener.set(Vec3::new(elapsed * 1.4, 0.0, 0.0));

        let area = (elapsed / THEME_SECONDS) as usize;
        let wanted = theme_names.get(area).map(String::as_str);
        if wanted != current_theme.as_deref() {
            manager.activate_theme(wanted);
            current_theme = wanted.map(str::to_string);
        }

        if has_footsteps && current_theme.is_some() && elapsed >= next_step {
            let volume = rng.gen_range(0.4..0.6);
            let pitch = rng.gen_range(0.9..1.1);
            // Failures are logged by the engine
            let _ = manager.play_one_shot(&footstep, volume, pitch);
            next_step += STEP_SECONDS;
        }

        if !dumped && elapsed >= DUMP_AT {
            manager.dump(0.2);
            dumped = true;
        }

        manager.update(dt);

        for event in events.try_iter() {
            match event {
                MixerEvent::RandomSoundFired { theme, sound } => {
                    tracing::info!("{}: {}", theme, sound.as_deref().unwrap_or("random sound"))
                }
                other => tracing::info!("{:?}", other),
            }
        }

        elapsed += dt;
        if let Some(rest) = TICK.checked_sub(frame_start.elapsed()) {
            std::thread::sleep(rest);
        }
    }

    manager.activate_theme(None);
    while manager.mixer().live_count() > 0 && elapsed < RUN_SECONDS + 30.0 {
        manager.update(dt);
        elapsed += dt;
        std::thread::sleep(TICK);
    }

    tracing::info!(
        "Demo finished, {} sources pooled",
        manager.engine().pool().len()
    );
    Ok(())
}
