//! Cooking Sim - A scripted kitchen session demonstrating cooking_core
//!
//! This sim shows:
//! - Cooking food with a growing skill (bonus levels and perfect rolls)
//! - Stacking cooked items by their bonus
//! - Live factor edits rescaling every cooked item
//! - Eating perfect food for the happy buff
//! - Saving and loading items and the active food memory
//!
//! Usage: `cooking_sim [settings.toml] [key=value ...]`
//! e.g. `cooking_sim factors.health=3 happy.required_level=20`

use cooking_core::config::{parse_assignment, ConfigError};
use cooking_core::item::{
    stacking::can_merge, ExtendedData, Extension, ExtensionError, ItemInstance,
};
use cooking_core::{
    bonus_preview, default_settings, BlueprintId, BonusEngine, CookingSettings, FoodBonusMemory,
    HappyBuff, ItemId, SkillProgression, SkillRaise, StatBlueprint, StatChannel,
};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use std::error::Error;
use std::path::Path;
use tracing::info;

/// Experience needed to go from skill 0 to skill 1
const EXPERIENCE_TO_MASTER: f64 = 100.0;

/// The player's cooking skill, growing with every meal
struct Cook {
    experience: f64,
}

impl SkillProgression for Cook {
    fn skill_factor(&self) -> f64 {
        (self.experience / EXPERIENCE_TO_MASTER).min(1.0)
    }

    fn raise_skill(&mut self, raise: SkillRaise) {
        self.experience += raise.experience();
    }
}

/// Recipes known to the kitchen
struct Pantry {
    stew: BlueprintId,
    bread: BlueprintId,
    mead: BlueprintId,
}

impl Pantry {
    fn stock(engine: &mut BonusEngine) -> Self {
        Pantry {
            stew: engine.register_blueprint(StatBlueprint::new(40.0, 20.0, 2.0)),
            bread: engine.register_blueprint(StatBlueprint::new(23.0, 46.0, 2.0).with_eitr(12.0)),
            mead: engine.register_blueprint(StatBlueprint::new(0.0, 0.0, 0.0)),
        }
    }
}

/// Helper to print a separator
fn separator(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("  {}", title);
    println!("{}\n", "=".repeat(60));
}

/// Helper to print an item and its current stats
fn print_item(engine: &BonusEngine, item: &ItemInstance) {
    let bonus = match item.bonus() {
        Some(bonus) if bonus.is_perfect() => format!("level {} (perfect)", bonus.level()),
        Some(bonus) => format!("level {}", bonus.level()),
        None => "no bonus".to_string(),
    };
    println!("  {} {} x{}: {}", item.id, item.name, item.stack, bonus);

    if let Some(stats) = engine.stats(item) {
        for channel in StatChannel::all() {
            if stats.has_channel(*channel) {
                println!("    {}: {:.1}", channel, stats.get(*channel));
            }
        }
    }
}

fn load_settings(args: &[String]) -> Result<CookingSettings, ConfigError> {
    match args.iter().find(|arg| !arg.contains('=')) {
        Some(path) => CookingSettings::load(Path::new(path)),
        None => Ok(default_settings()),
    }
}

/// A stack as written to a save file
struct SavedStack {
    name: String,
    base: BlueprintId,
    count: u32,
    records: Option<String>,
}

/// Kitchen state for one session
struct Kitchen {
    engine: BonusEngine,
    pantry: Pantry,
    cook: Cook,
    rng: ChaCha8Rng,
    next_id: u64,
    stacks: Vec<ItemInstance>,
}

impl Kitchen {
    fn new(settings: &CookingSettings, seed: u64) -> Self {
        let mut engine = BonusEngine::new(settings);
        let pantry = Pantry::stock(&mut engine);
        Kitchen {
            engine,
            pantry,
            cook: Cook { experience: 0.0 },
            rng: ChaCha8Rng::seed_from_u64(seed),
            next_id: 1,
            stacks: Vec::new(),
        }
    }

    fn new_item(&mut self, name: &str, blueprint: BlueprintId) -> ItemInstance {
        let item = ItemInstance::new(ItemId(self.next_id), name, blueprint);
        self.next_id += 1;
        item
    }

    /// Cook one item and put it on a compatible stack, or start a new one
    fn cook(&mut self, name: &str, blueprint: BlueprintId) {
        let mut item = self.new_item(name, blueprint);
        self.engine.on_item_created(&mut item, &mut self.cook, &mut self.rng);

        let target = self.stacks.iter().position(|stack| can_merge(stack, &item));
        match target {
            Some(index) => {
                self.stacks[index].stack += 1;
                // The merged item is gone; its private copy goes with it
                self.engine.destroy_item(item);
            }
            None => self.stacks.push(item),
        }
    }

    fn print_stacks(&self) {
        for stack in &self.stacks {
            print_item(&self.engine, stack);
        }
    }

    /// Save every stack as a plain item plus its extension records
    fn save(&self) -> Result<Vec<SavedStack>, ExtensionError> {
        self.stacks
            .iter()
            .map(|stack| {
                let records = stack.extended.as_ref().map(ExtendedData::to_json).transpose()?;
                Ok(SavedStack {
                    name: stack.name.clone(),
                    base: self.base_of(&stack.name),
                    count: stack.stack,
                    records,
                })
            })
            .collect()
    }

    fn base_of(&self, name: &str) -> BlueprintId {
        match name {
            "bread" => self.pantry.bread,
            "mead" => self.pantry.mead,
            _ => self.pantry.stew,
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let settings = load_settings(&args)?;
    let mut kitchen = Kitchen::new(&settings, 42);

    for assignment in args.iter().filter(|arg| arg.contains('=')) {
        let (key, value) = parse_assignment(assignment)?;
        if let Some(change) = kitchen.engine.set(key, value) {
            info!(?change, "applied override");
        }
    }

    // =========================================================================
    separator("PREVIEW");
    // =========================================================================
    let stew = kitchen.pantry.stew;
    for skill in [0.0, 0.25, 0.73, 1.0] {
        let base = kitchen.engine.blueprints().get(stew).cloned().unwrap_or_default();
        match bonus_preview(&base, skill, kitchen.engine.config()) {
            Some(preview) => {
                let gains: Vec<String> = preview
                    .gains
                    .iter()
                    .map(|(channel, gain)| format!("{} +{}", channel, gain))
                    .collect();
                println!("  skill {:.2}: level {} ({})", skill, preview.level, gains.join(", "));
            }
            None => println!("  skill {:.2}: no bonus", skill),
        }
    }

    // =========================================================================
    separator("COOKING");
    // =========================================================================
    let bread = kitchen.pantry.bread;
    let mead = kitchen.pantry.mead;
    for round in 0..12 {
        kitchen.cook("stew", stew);
        if round % 3 == 0 {
            kitchen.cook("bread", bread);
        }
    }
    kitchen.cook("mead", mead);
    println!(
        "  Cook skill: {:.2} ({:.0} xp)",
        kitchen.cook.skill_factor(),
        kitchen.cook.experience
    );
    println!("  Live bonused blueprints: {}", kitchen.engine.registry().len());
    kitchen.print_stacks();

    // =========================================================================
    separator("LIVE FACTOR EDIT");
    // =========================================================================
    if let Some(change) = kitchen.engine.set_factor(StatChannel::Health, 3.5) {
        println!("  {:?}", change);
    }
    if let Some(change) = kitchen.engine.set_factor(StatChannel::Eitr, 2.0) {
        println!("  {:?}", change);
    }
    kitchen.print_stacks();

    // =========================================================================
    separator("EATING");
    // =========================================================================
    let mut buff: Option<HappyBuff> = None;
    for stack in &kitchen.stacks {
        let Some(granted) = kitchen.engine.on_item_eaten(stack, true) else {
            continue;
        };
        println!(
            "  Ate perfect {} {}: +{:.0}% speed for {:.0}s",
            stack.name,
            stack.id,
            granted.speed_bonus_percent(),
            granted.duration
        );
        match buff.as_mut() {
            Some(active) => active.refresh(kitchen.engine.config()),
            None => buff = Some(granted),
        }
    }
    match buff.as_mut() {
        Some(active) => {
            let mut seconds = 0.0;
            while active.tick(30.0) {
                seconds += 30.0;
            }
            println!("  Happy wore off after ~{:.0}s", seconds + 30.0);
        }
        None => println!("  No perfect food this session"),
    }
    // Everything but the mead is still being digested
    let digested = kitchen.stacks.iter().filter(|stack| stack.name != "mead");
    let memory = FoodBonusMemory::record(digested);

    // =========================================================================
    separator("SAVE AND LOAD");
    // =========================================================================
    let saved = kitchen.save()?;
    for stack in std::mem::take(&mut kitchen.stacks) {
        kitchen.engine.destroy_item(stack);
    }
    println!(
        "  Saved {} stacks, {} blueprints left after unload",
        saved.len(),
        kitchen.engine.blueprints().len()
    );

    for saved_stack in saved {
        let mut item = kitchen
            .new_item(&saved_stack.name, saved_stack.base)
            .with_stack(saved_stack.count);
        if let Some(json) = saved_stack.records {
            item.extended = Some(ExtendedData::from_json(&json)?);
        }
        kitchen.engine.on_item_loaded(&mut item);
        kitchen.stacks.push(item);
    }
    kitchen.print_stacks();

    // Active foods come back without extension state
    let mut digesting: Vec<ItemInstance> = Vec::new();
    for name in ["stew", "bread"] {
        let base = kitchen.base_of(name);
        digesting.push(kitchen.new_item(name, base));
    }
    let restored = memory.restore(&mut kitchen.engine, &mut digesting);
    println!("  Restored {} active food bonuses", restored);
    for food in &digesting {
        print_item(&kitchen.engine, food);
    }

    // =========================================================================
    separator("CLEANUP");
    // =========================================================================
    let note = Extension::Note("end of session".into());
    if let Some(first) = kitchen.stacks.first_mut() {
        first.extended_mut().push(note);
    }
    for item in kitchen.stacks.drain(..).chain(digesting) {
        kitchen.engine.destroy_item(item);
    }
    println!(
        "  Blueprints: {}, live bonuses: {}",
        kitchen.engine.blueprints().len(),
        kitchen.engine.registry().len()
    );

    Ok(())
}
