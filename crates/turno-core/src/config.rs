use std::collections::BTreeMap;
use std::fs;
use std::path::{
  Path,
  PathBuf
};

use anyhow::{
  Context,
  anyhow
};
use chrono::Weekday;
use tracing::{
  debug,
  info,
  trace,
  warn
};

use crate::calendar::parse_week_start;
use crate::locale::Locale;

const TURNORC_ENV_VAR: &str = "TURNORC";
const TURNORC_FILE: &str = ".turnorc";

const DEFAULTS: [(&str, &str); 7] = [
  ("color", "on"),
  ("week.start", "sunday"),
  ("locale", "es"),
  ("display.month", "today"),
  ("default.command", "month"),
  ("agenda.days", "14"),
  ("grid.short", "off")
];

#[derive(Debug, Clone)]
pub struct Config {
  map:              BTreeMap<String, String>,
  pub loaded_files: Vec<PathBuf>
}

impl Default for Config {
  fn default() -> Self {
    Self {
      map:          DEFAULTS
        .iter()
        .map(|(k, v)| {
          (k.to_string(), v.to_string())
        })
        .collect(),
      loaded_files: vec![]
    }
  }
}

impl Config {
  #[tracing::instrument(skip(
    turnorc_override
  ))]
  pub fn load(
    turnorc_override: Option<&Path>
  ) -> anyhow::Result<Self> {
    let mut cfg = Config::default();

    let turnorc = resolve_turnorc_path(
      turnorc_override
    )?;
    if let Some(path) = turnorc {
      info!(turnorc = %path.display(), "loading turnorc");
      cfg.load_file(&path, &mut vec![])?;
    } else {
      debug!(
        "no turnorc found; using \
         defaults"
      );
    }

    Ok(cfg)
  }

  #[tracing::instrument(skip(
    self, overrides
  ))]
  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    for (k, v) in overrides {
      let key = k
        .strip_prefix("rc.")
        .unwrap_or(&k)
        .to_string();
      debug!(key = %key, value = %v, "applying override");
      self.map.insert(key, v);
    }
  }

  pub fn get(
    &self,
    key: &str
  ) -> Option<String> {
    self.map.get(key).cloned()
  }

  /// Boolean setting, falling back to
  /// `default` when unset. Unknown
  /// spellings are errors.
  pub fn flag(
    &self,
    key: &str,
    default: bool
  ) -> anyhow::Result<bool> {
    match self.map.get(key) {
      | Some(raw) => {
        parse_bool(raw).ok_or_else(|| {
          anyhow!(
            "invalid {key} setting: \
             {raw} (expected on/off, \
             yes/no, true/false or 1/0)"
          )
        })
      }
      | None => Ok(default)
    }
  }

  pub fn iter(
    &self
  ) -> impl Iterator<Item = (&String, &String)>
  {
    self.map.iter()
  }

  pub fn week_start(
    &self
  ) -> anyhow::Result<Weekday> {
    let raw = self
      .get("week.start")
      .unwrap_or_else(|| {
        "sunday".to_string()
      });
    parse_week_start(&raw)
  }

  pub fn locale(
    &self
  ) -> anyhow::Result<Locale> {
    self
      .get("locale")
      .unwrap_or_else(|| "es".to_string())
      .parse()
  }

  pub fn agenda_days(
    &self
  ) -> anyhow::Result<u32> {
    let raw = self
      .get("agenda.days")
      .unwrap_or_else(|| "14".to_string());
    raw.trim().parse::<u32>().with_context(
      || {
        format!(
          "invalid agenda.days: {raw}"
        )
      }
    )
  }

  /// Reads one rc file. `chain` holds
  /// the canonical paths of the files
  /// currently being included.
  #[tracing::instrument(skip(
    self, chain
  ))]
  fn load_file(
    &mut self,
    path: &Path,
    chain: &mut Vec<PathBuf>
  ) -> anyhow::Result<()> {
    let path = expand_tilde(path);
    let text =
      fs::read_to_string(&path)
        .with_context(|| {
          format!(
            "failed to read {}",
            path.display()
          )
        })?;
    let canonical =
      fs::canonicalize(&path)
        .with_context(|| {
          format!(
            "failed to resolve {}",
            path.display()
          )
        })?;
    chain.push(canonical);

    self
      .loaded_files
      .push(path.clone());

    let base_dir = path
      .parent()
      .map(|p| p.to_path_buf())
      .unwrap_or_else(|| {
        PathBuf::from(".")
      });

    for (line_num, raw_line) in
      text.lines().enumerate()
    {
      let mut line = raw_line.trim();
      if let Some((before, _)) =
        line.split_once('#')
      {
        line = before.trim();
      }

      if line.is_empty() {
        continue;
      }

      if let Some(include_rest) =
        line.strip_prefix("include ")
      {
        let include_path =
          resolve_include_path(
            &base_dir,
            include_rest.trim()
          )?;
        debug!(
            file = %path.display(),
            include = %include_path.display(),
            line = line_num + 1,
            "processing include"
        );

        if include_path.exists() {
          let target = fs::canonicalize(
            &include_path
          )
          .with_context(|| {
            format!(
              "failed to resolve {}",
              include_path.display()
            )
          })?;
          if chain.contains(&target) {
            return Err(anyhow!(
              "include cycle at {}:{}: {}",
              path.display(),
              line_num + 1,
              include_path.display()
            ));
          }
          self.load_file(
            &include_path,
            chain
          )?;
        } else {
          warn!(include = %include_path.display(), "include file does not exist; skipping");
        }
        continue;
      }

      let (k, v) = line
        .split_once('=')
        .ok_or_else(|| {
          anyhow!(
            "invalid config line \
             {}:{}: {}",
            path.display(),
            line_num + 1,
            raw_line
          )
        })?;

      let key = k.trim().to_string();
      let value = v.trim().to_string();
      trace!(key = %key, value = %value, "loaded config key");
      self.map.insert(key, value);
    }

    chain.pop();
    Ok(())
  }
}

#[tracing::instrument(skip(
  override_path
))]
fn resolve_turnorc_path(
  override_path: Option<&Path>
) -> anyhow::Result<Option<PathBuf>> {
  if let Some(path) = override_path {
    return Ok(Some(path.to_path_buf()));
  }

  if let Ok(env_path) =
    std::env::var(TURNORC_ENV_VAR)
  {
    if env_path == "/dev/null" {
      return Ok(None);
    }
    return Ok(Some(PathBuf::from(
      env_path
    )));
  }

  let Some(home) = dirs::home_dir()
  else {
    warn!(
      "cannot determine home \
       directory; skipping turnorc"
    );
    return Ok(None);
  };
  let candidate =
    home.join(TURNORC_FILE);
  if candidate.exists() {
    return Ok(Some(candidate));
  }

  Ok(None)
}

fn resolve_include_path(
  base_dir: &Path,
  include: &str
) -> anyhow::Result<PathBuf> {
  if include.trim().is_empty() {
    return Err(anyhow!(
      "include path cannot be empty"
    ));
  }

  let raw = PathBuf::from(include);
  let expanded = expand_tilde(&raw);
  if expanded.is_absolute() {
    Ok(expanded)
  } else {
    Ok(base_dir.join(expanded))
  }
}

fn expand_tilde(
  path: &Path
) -> PathBuf {
  let text = path.to_string_lossy();
  if let Some(rest) =
    text.strip_prefix("~/")
    && let Some(home) = dirs::home_dir()
  {
    return home.join(rest);
  }
  path.to_path_buf()
}

fn parse_bool(s: &str) -> Option<bool> {
  match s
    .trim()
    .to_ascii_lowercase()
    .as_str()
  {
    | "1" | "yes" | "on" | "true" => {
      Some(true)
    }
    | "0" | "no" | "off" | "false" => {
      Some(false)
    }
    | _ => None
  }
}

#[cfg(test)]
mod tests {
  use std::fs;

  use chrono::Weekday;
  use tempfile::tempdir;

  use super::Config;
  use crate::locale::Locale;

  #[test]
  fn defaults_use_spanish_sunday_grid() {
    let cfg = Config::default();
    assert_eq!(
      cfg.week_start().expect("week start"),
      Weekday::Sun
    );
    assert_eq!(
      cfg.locale().expect("locale"),
      Locale::Es
    );
    assert_eq!(
      cfg.get("default.command").as_deref(),
      Some("month")
    );
    assert!(!cfg.flag("grid.short", true).expect("grid.short"));
    assert!(cfg.flag("color", false).expect("color"));
    assert_eq!(cfg.agenda_days().expect("agenda"), 14);
  }

  #[test]
  fn loads_file_with_includes_and_comments() {
    let dir = tempdir().expect("tempdir");
    let extra = dir.path().join("extra.rc");
    fs::write(&extra, "locale=en\n")
      .expect("write include");
    let main = dir.path().join("turnorc");
    fs::write(
      &main,
      "# rotation display\n\
       week.start = monday   # iso weeks\n\
       \n\
       include extra.rc\n\
       include missing.rc\n",
    )
    .expect("write rc");

    let cfg = Config::load(Some(main.as_path()))
      .expect("load config");
    assert_eq!(cfg.loaded_files.len(), 2);
    assert_eq!(
      cfg.week_start().expect("week start"),
      Weekday::Mon
    );
    assert_eq!(
      cfg.locale().expect("locale"),
      Locale::En
    );
    assert_eq!(
      cfg.get("color").as_deref(),
      Some("on")
    );
  }

  #[test]
  fn reports_malformed_line() {
    let dir = tempdir().expect("tempdir");
    let main = dir.path().join("turnorc");
    fs::write(&main, "locale en\n")
      .expect("write rc");

    let err = Config::load(Some(main.as_path()))
      .expect_err("should fail");
    assert!(
      err
        .to_string()
        .contains(":1:")
    );
  }

  #[test]
  fn overrides_strip_rc_prefix() {
    let mut cfg = Config::default();
    cfg.apply_overrides(vec![
      (
        "rc.week.start".to_string(),
        "monday".to_string()
      ),
      (
        "agenda.days".to_string(),
        "3".to_string()
      ),
    ]);
    assert_eq!(
      cfg.week_start().expect("week start"),
      Weekday::Mon
    );
    assert_eq!(cfg.agenda_days().expect("agenda"), 3);
  }

  #[test]
  fn invalid_values_surface_as_errors() {
    let mut cfg = Config::default();
    cfg.apply_overrides(vec![
      (
        "locale".to_string(),
        "fr".to_string()
      ),
      (
        "agenda.days".to_string(),
        "lots".to_string()
      ),
    ]);
    assert!(cfg.locale().is_err());
    assert!(cfg.agenda_days().is_err());
  }

  #[test]
  fn self_include_is_a_cycle() {
    let dir = tempdir().expect("tempdir");
    let main = dir.path().join("turnorc");
    fs::write(
      &main,
      "locale=en\ninclude turnorc\n"
    )
    .expect("write rc");

    let err = Config::load(Some(main.as_path()))
      .expect_err("should fail");
    let msg = err.to_string();
    assert!(msg.contains("include cycle"), "{msg}");
    assert!(msg.contains(":2:"), "{msg}");
  }

  #[test]
  fn mutual_includes_are_a_cycle() {
    let dir = tempdir().expect("tempdir");
    let a = dir.path().join("a.rc");
    let b = dir.path().join("b.rc");
    fs::write(&a, "include b.rc\n")
      .expect("write a");
    fs::write(&b, "include ./a.rc\n")
      .expect("write b");

    let err = Config::load(Some(a.as_path()))
      .expect_err("should fail");
    assert!(
      err
        .to_string()
        .contains("include cycle")
    );
  }

  #[test]
  fn shared_include_is_not_a_cycle() {
    let dir = tempdir().expect("tempdir");
    let common = dir.path().join("common.rc");
    let left = dir.path().join("left.rc");
    let main = dir.path().join("turnorc");
    fs::write(&common, "locale=en\n")
      .expect("write common");
    fs::write(&left, "include common.rc\n")
      .expect("write left");
    fs::write(
      &main,
      "include left.rc\ninclude common.rc\n"
    )
    .expect("write rc");

    let cfg = Config::load(Some(main.as_path()))
      .expect("load config");
    assert_eq!(cfg.loaded_files.len(), 4);
    assert_eq!(
      cfg.locale().expect("locale"),
      Locale::En
    );
  }

  #[test]
  fn booleans_share_one_vocabulary() {
    for key in ["color", "grid.short"] {
      for (raw, expected) in [
        ("on", true),
        ("Yes", true),
        ("1", true),
        ("off", false),
        ("FALSE", false),
        ("0", false)
      ] {
        let mut cfg = Config::default();
        cfg.apply_overrides(vec![(
          key.to_string(),
          raw.to_string()
        )]);
        assert_eq!(
          cfg.flag(key, !expected).expect("flag"),
          expected,
          "{key}={raw}"
        );
      }

      let mut cfg = Config::default();
      cfg.apply_overrides(vec![(
        key.to_string(),
        "y".to_string()
      )]);
      let err = cfg
        .flag(key, false)
        .expect_err("y is not accepted");
      assert!(err.to_string().contains(key));
    }
  }
}
