use std::{
    env, fs,
    io::Write,
    path::{Path, PathBuf},
};

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy)]
enum IRArcProfile {
    Trapezoidal,
    RampUp,
    RampDown,
}
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy)]
enum IRBrake {
    Coast,
    Brake,
    Hold,
}
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone)]
enum IRAction {
    Drive(f64, f64),
    DriveAsync(f64, f64),
    Turn(f64, f64),
    TurnAsync(f64, f64),
    Settle,
    FastDrive(f64, f64),
    TimeDrive(u64, f64, f64),
    VelocityDrive(u64, f64),
    Arc(bool, i32, f64, f64, IRArcProfile),
    SCurve(bool, i32, u32, i32, f64),
    Brake(IRBrake),
    Reset,
    SetSpeed(f64),
    Intake(f64),
    IntakeTo(f64),
    Wait(u64),
}
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone)]
struct IRRoutine {
    name: String,
    actions: Vec<IRAction>,
}

fn parse_number(s: &str) -> f64 {
    s.trim().parse::<f64>().expect("invalid number")
}
fn parse_int<T: std::str::FromStr>(s: &str) -> T {
    s.trim().parse::<T>().ok().expect("invalid integer")
}
/// `left` puts the left side on the inside of the curve.
fn parse_side(s: &str) -> bool {
    match s.trim() {
        "left" => false,
        "right" => true,
        _ => panic!("invalid side, expected left or right"),
    }
}
fn parse_profile(s: &str) -> IRArcProfile {
    match s.trim() {
        "trapezoidal" => IRArcProfile::Trapezoidal,
        "ramp_up" => IRArcProfile::RampUp,
        "ramp_down" => IRArcProfile::RampDown,
        _ => panic!("invalid arc profile"),
    }
}

/// `key=value` pairs trailing the positional arguments.
struct Attrs<'a> {
    pairs: Vec<(&'a str, &'a str)>,
}

impl<'a> Attrs<'a> {
    fn parse(mut rest: &'a str) -> Self {
        let mut pairs = Vec::new();
        while let Some(idx) = rest.find('=') {
            let (key_part, value_rest) = rest.split_at(idx);
            let key = key_part.split_whitespace().last().unwrap_or("");
            let value_and_more = &value_rest[1..];
            let end = value_and_more.find(' ');
            let end_idx = end.unwrap_or(value_and_more.len());
            pairs.push((key, &value_and_more[..end_idx]));
            if end.is_none() {
                break;
            }
            rest = &value_and_more[end_idx + 1..];
        }
        Self { pairs }
    }

    fn get(&self, key: &str) -> Option<&'a str> {
        self.pairs.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
    }

    fn number(&self, key: &str, default: f64) -> f64 {
        self.get(key).map(parse_number).unwrap_or(default)
    }
}

/// Splits a line into its positional arguments and its attributes.
fn split_args(after: &str) -> (Vec<&str>, Attrs<'_>) {
    let first_attr = after.find('=').map(|idx| {
        after[..idx]
            .rfind(' ')
            .map(|space| space + 1)
            .unwrap_or(0)
    });
    let (positional, attrs) = match first_attr {
        Some(start) => after.split_at(start),
        None => (after, ""),
    };
    (positional.split_whitespace().collect(), Attrs::parse(attrs))
}

fn parse_routine(name: &str, content: &str) -> IRRoutine {
    let lines = content
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty() && !l.starts_with('#'));
    let mut actions: Vec<IRAction> = Vec::new();

    for line in lines {
        let (command, after) = line.split_once(' ').unwrap_or((line, ""));
        let (args, attrs) = split_args(after.trim());
        let arg = |i: usize| {
            *args
                .get(i)
                .unwrap_or_else(|| panic!("{command}: missing argument {i}"))
        };
        let speed = attrs.number("speed", 100.0);
        match command {
            // drive tiles [speed=]
            "drive" => actions.push(IRAction::Drive(parse_number(arg(0)), speed)),
            "drive_async" => actions.push(IRAction::DriveAsync(parse_number(arg(0)), speed)),
            // turn degrees [speed=]
            "turn" => actions.push(IRAction::Turn(parse_number(arg(0)), speed)),
            "turn_async" => actions.push(IRAction::TurnAsync(parse_number(arg(0)), speed)),
            "settle" => actions.push(IRAction::Settle),
            // fast_drive tiles [speed=]
            "fast_drive" => actions.push(IRAction::FastDrive(parse_number(arg(0)), speed)),
            // time_drive milliseconds left=percent right=percent
            "time_drive" => actions.push(IRAction::TimeDrive(
                parse_int(arg(0)),
                attrs.number("left", speed),
                attrs.number("right", speed),
            )),
            // velocity_drive milliseconds [speed=]
            "velocity_drive" => actions.push(IRAction::VelocityDrive(parse_int(arg(0)), speed)),
            // arc left|right ticks [radius=] [speed=] [profile=]
            "arc" => actions.push(IRAction::Arc(
                parse_side(arg(0)),
                parse_int(arg(1)),
                attrs.number("radius", 0.5),
                speed,
                attrs.get("profile").map(parse_profile).unwrap_or(IRArcProfile::Trapezoidal),
            )),
            // s_curve left|right arc1 mid arc2 [speed=]
            "s_curve" => actions.push(IRAction::SCurve(
                parse_side(arg(0)),
                parse_int(arg(1)),
                parse_int(arg(2)),
                parse_int(arg(3)),
                speed,
            )),
            "brake" => actions.push(IRAction::Brake(match arg(0) {
                "coast" => IRBrake::Coast,
                "brake" => IRBrake::Brake,
                "hold" => IRBrake::Hold,
                other => panic!("invalid brake mode {other}"),
            })),
            "reset" => actions.push(IRAction::Reset),
            "set_speed" => actions.push(IRAction::SetSpeed(parse_number(arg(0)))),
            // intake percent
            "intake" => actions.push(IRAction::Intake(parse_number(arg(0)))),
            // intake_to degrees
            "intake_to" => actions.push(IRAction::IntakeTo(parse_number(arg(0)))),
            "wait" => actions.push(IRAction::Wait(parse_int(arg(0)))),
            _ => {
                // unknown line types are ignored
                println!("cargo:warning={name}: ignoring `{line}`");
            }
        }
    }
    IRRoutine {
        name: name.to_string(),
        actions,
    }
}

fn find_routine_files(dir: &Path) -> Vec<PathBuf> {
    let mut res = Vec::new();
    if let Ok(read) = fs::read_dir(dir) {
        for e in read.flatten() {
            let p = e.path();
            if p.extension().and_then(|s| s.to_str()) == Some("routine") {
                if let Some(name) = p.file_name().and_then(|s| s.to_str())
                    && (name.starts_with('.') || name.starts_with("._"))
                {
                    continue;
                }
                res.push(p);
            }
        }
    }
    res.sort();
    res
}

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let routines_dir = Path::new("src/routines");
    println!("cargo:rerun-if-changed=src/routines");
    let files = find_routine_files(routines_dir);
    let mut index_src = String::from("pub static ROUTINE_BLOBS: &[(&str, &[u8])] = &[\n");
    for file in files {
        let name = file.file_stem().unwrap().to_string_lossy().to_string();
        println!("cargo:rerun-if-changed={}", file.display());
        let content = fs::read_to_string(&file).expect("read .routine");
        let routine = parse_routine(&name, &content);
        let bytes = postcard::to_allocvec(&routine).expect("serialize routine");
        let out_file = out_dir.join(format!("routine_{name}.bin"));
        fs::write(&out_file, &bytes).expect("write bin");
        index_src.push_str(&format!(
            "    (\"{}\", include_bytes!(concat!(env!(\"OUT_DIR\"), \"/{}\")) as &[u8]),\n",
            name,
            out_file.file_name().unwrap().to_string_lossy()
        ));
    }
    index_src.push_str("];");
    let mut f = fs::File::create(out_dir.join("routines_index.rs")).expect("create index");
    f.write_all(index_src.as_bytes()).unwrap();
}
