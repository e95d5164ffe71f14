use std::path::Path;

use regex::{Captures, Regex};

use crate::ConfigError;

lazy_static! {
    /// `{}` or `{N}`.
    static ref PLACEHOLDER: Regex = Regex::new(r"\{(\d*)\}").expect("Invalid placeholder regex");
}

/// Substitute the placeholders of a template. `{}` takes the next value, `{N}` the N-th one.
///
/// ```
/// use hazmat_lang::render;
///
/// assert_eq!(render("{} {} -o {}", &["gcc", "a.c", "a"]).unwrap(), "gcc a.c -o a");
/// assert_eq!(render("{1} {0}", &["x", "y"]).unwrap(), "y x");
/// assert!(render("{} {}", &["only one"]).is_err());
/// ```
pub fn render(template: &str, values: &[&str]) -> Result<String, ConfigError> {
    let mut next = 0;
    let mut missing = None;
    let rendered = PLACEHOLDER.replace_all(template, |caps: &Captures| {
        let index = match caps[1].parse::<usize>() {
            Ok(index) => index,
            Err(_) => {
                next += 1;
                next - 1
            }
        };
        match values.get(index) {
            Some(value) => value.to_string(),
            None => {
                missing.get_or_insert(index);
                String::new()
            }
        }
    });
    if let Some(index) = missing {
        return Err(ConfigError::InvalidTemplate {
            template: template.to_string(),
            reason: format!("no value for placeholder {}", index),
        });
    }
    Ok(rendered.into_owned())
}

/// Render a command template and split it into the arguments, following the shell quoting rules.
pub fn command_line(template: &str, values: &[&str]) -> Result<Vec<String>, ConfigError> {
    let rendered = render(template, values)?;
    let args = shell_words::split(&rendered).map_err(|e| ConfigError::InvalidTemplate {
        template: template.to_string(),
        reason: e.to_string(),
    })?;
    if args.is_empty() {
        return Err(ConfigError::InvalidTemplate {
            template: template.to_string(),
            reason: "the command is empty".into(),
        });
    }
    Ok(args)
}

/// Quote a path so that it survives `command_line` as a single argument.
pub(crate) fn quote<P: AsRef<Path>>(path: P) -> String {
    shell_words::quote(&path.as_ref().to_string_lossy()).into_owned()
}
