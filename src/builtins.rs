//! Ambient capability whitelist for the expression language.
//!
//! Documents get a fixed, enumerated set of functions — a math table plus
//! `random` — instead of reach into any host namespace.  `Math.floor(x)` and
//! plain `floor(x)` are the same entry; `console.log` / `log` is handled by
//! the engine because it writes to the engine's sink.
//!
//! Each function receives a `Vec<Value>` of already-evaluated arguments and
//! returns `Result<Value, String>`.

use crate::value::Value;

// ── Lcg ───────────────────────────────────────────────────────────────────────

/// Small linear congruential generator backing `random()` and `hs-random`.
///
/// Seedable so tests can pin the sequence; the default seed comes from the
/// clock.  Constants are the classic Numerical Recipes pair.
#[derive(Debug, Clone)]
pub struct Lcg {
    state: u64,
}

impl Lcg {
    pub fn new() -> Self {
        let seed = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0x2545_F491_4F6C_DD1D);
        Self::seeded(seed | 1)
    }

    pub fn seeded(seed: u64) -> Self {
        Lcg { state: seed }
    }

    fn next_u32(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        (self.state >> 33) as u32
    }

    /// Uniform float in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / f64::from(u32::MAX) * (1.0 - f64::EPSILON)
    }

    /// Uniform integer in `min..=max` (the `hs-random` contract:
    /// `floor(random() * (max - min + 1)) + min`).  Degenerate ranges
    /// collapse to `min`.
    pub fn next_range(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        (self.next_f64() * (max - min + 1) as f64).floor() as i64 + min
    }
}

impl Default for Lcg {
    fn default() -> Self {
        Self::new()
    }
}

// ── Dispatch ──────────────────────────────────────────────────────────────────

/// Dispatch a whitelisted capability call.
///
/// Returns `None` if the name is not in the whitelist (the caller reports
/// that as an evaluation failure — there is no fallback namespace).
pub fn call_builtin(name: &str, args: Vec<Value>, rng: &mut Lcg) -> Option<Result<Value, String>> {
    fn inner(name: &str, args: Vec<Value>, rng: &mut Lcg) -> Result<Option<Value>, String> {
        Ok(Some(match name {
            "floor" => Value::Int(get_float(&args, 0, name)?.floor() as i64),
            "ceil" => Value::Int(get_float(&args, 0, name)?.ceil() as i64),
            "round" => Value::Int(get_float(&args, 0, name)?.round() as i64),
            "trunc" => Value::Int(get_float(&args, 0, name)?.trunc() as i64),
            "abs" => {
                let v = args
                    .into_iter()
                    .next()
                    .ok_or_else(|| format!("{name}: too few args"))?;
                match v {
                    Value::Int(n) => Value::Int(n.abs()),
                    Value::Float(x) => Value::Float(x.abs()),
                    other => Value::Int(other.as_int().abs()),
                }
            }
            "min" => fold_numeric(&args, name, |a, b| if b < a { b } else { a })?,
            "max" => fold_numeric(&args, name, |a, b| if b > a { b } else { a })?,
            "sqrt" => Value::Float(get_float(&args, 0, name)?.sqrt()),
            "pow" => {
                let base = get_float(&args, 0, name)?;
                let exp = get_float(&args, 1, name)?;
                Value::Float(base.powf(exp))
            }
            "random" => Value::Float(rng.next_f64()),
            "number" => {
                // Explicit numeric coercion: integers stay integers.
                let v = args
                    .into_iter()
                    .next()
                    .ok_or_else(|| format!("{name}: too few args"))?;
                match v {
                    Value::Int(n) => Value::Int(n),
                    Value::Float(x) => Value::Float(x),
                    other => {
                        let s = other.as_str();
                        if let Ok(n) = s.trim().parse::<i64>() {
                            Value::Int(n)
                        } else {
                            Value::Float(other.as_float())
                        }
                    }
                }
            }
            _ => return Ok(None),
        }))
    }
    inner(name, args, rng).transpose()
}

// ── Argument helpers ──────────────────────────────────────────────────────────

fn get_float(args: &[Value], idx: usize, name: &str) -> Result<f64, String> {
    args.get(idx)
        .map(Value::as_float)
        .ok_or_else(|| format!("{name}: too few args"))
}

/// Fold a variadic numeric argument list, keeping Int when every argument is
/// an Int.
fn fold_numeric(
    args: &[Value],
    name: &str,
    pick: fn(f64, f64) -> f64,
) -> Result<Value, String> {
    if args.is_empty() {
        return Err(format!("{name}: too few args"));
    }
    let all_int = args.iter().all(|v| matches!(v, Value::Int(_)));
    let mut acc = args[0].as_float();
    for v in &args[1..] {
        acc = pick(acc, v.as_float());
    }
    Ok(if all_int {
        Value::Int(acc as i64)
    } else {
        Value::Float(acc)
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
