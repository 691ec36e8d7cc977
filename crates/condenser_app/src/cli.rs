use std::path::PathBuf;

pub const USAGE: &str =
    "usage: condenser_app [--out DIR] [--model NAME] [--max-tokens N] URL [URL...]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub sources: Vec<String>,
    pub output_dir: PathBuf,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
}

pub fn parse(mut args: impl Iterator<Item = String>) -> Result<Options, String> {
    let mut sources = Vec::new();
    let mut output_dir = PathBuf::from("./summaries");
    let mut model = None;
    let mut max_tokens = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--out" | "-o" => {
                output_dir = PathBuf::from(required_value(&arg, &mut args)?);
            }
            "--model" => {
                model = Some(required_value(&arg, &mut args)?);
            }
            "--max-tokens" => {
                let raw = required_value(&arg, &mut args)?;
                max_tokens = Some(
                    raw.parse::<u32>()
                        .map_err(|_| format!("--max-tokens expects a number, got {raw:?}"))?,
                );
            }
            flag if flag.starts_with('-') => {
                return Err(format!("unknown option {flag:?}"));
            }
            _ => sources.push(arg),
        }
    }

    if sources.is_empty() {
        return Err("no transcript URLs given".to_string());
    }

    Ok(Options {
        sources,
        output_dir,
        model,
        max_tokens,
    })
}

fn required_value(
    flag: &str,
    args: &mut impl Iterator<Item = String>,
) -> Result<String, String> {
    args.next().ok_or_else(|| format!("{flag} expects a value"))
}
