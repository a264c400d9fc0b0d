use std::time::Duration;

use tessera_clock::{Clock, System, UnixTime};

use super::Constraint;
use crate::{
    error,
    jwt::{claims, Token},
};

fn check_times(
    constraint: &'static str,
    token: &Token,
    now: UnixTime,
    leeway: Duration,
) -> Result<(), error::ConstraintError> {
    let latest = now.saturating_add(leeway);
    let earliest = now.saturating_sub(leeway);

    if !token.has_been_issued_before(latest) {
        return Err(error::ConstraintViolation::new(constraint, "the token was issued in the future").into());
    }

    if !token.is_minimum_time_before(latest) {
        return Err(error::ConstraintViolation::new(constraint, "the token cannot be used yet").into());
    }

    if token.is_expired(earliest) {
        return Err(error::ConstraintViolation::new(constraint, "the token is expired").into());
    }

    Ok(())
}

/// Requires the token to be usable at the current time
///
/// Each of `iat`, `nbf` and `exp` is only checked when present. The leeway
/// allows for clock drift between issuer and verifier.
#[derive(Clone, Debug)]
pub struct LooseValidAt<C = System> {
    clock: C,
    leeway: Duration,
}

impl<C: Clock> LooseValidAt<C> {
    const NAME: &'static str = "LooseValidAt";

    /// Checks times against `clock`, tolerating `leeway` in either direction
    pub fn new(clock: C, leeway: Duration) -> Self {
        Self { clock, leeway }
    }
}

impl<C: Clock + Send + Sync> Constraint for LooseValidAt<C> {
    fn assert(&self, token: &Token) -> Result<(), error::ConstraintError> {
        check_times(Self::NAME, token, self.clock.now(), self.leeway)
    }
}

/// Requires the token to carry `iat`, `nbf` and `exp` and to be usable at
/// the current time
#[derive(Clone, Debug)]
pub struct StrictValidAt<C = System> {
    clock: C,
    leeway: Duration,
}

impl<C: Clock> StrictValidAt<C> {
    const NAME: &'static str = "StrictValidAt";

    /// Checks times against `clock`, tolerating `leeway` in either direction
    pub fn new(clock: C, leeway: Duration) -> Self {
        Self { clock, leeway }
    }
}

impl<C: Clock + Send + Sync> Constraint for StrictValidAt<C> {
    fn assert(&self, token: &Token) -> Result<(), error::ConstraintError> {
        for &name in &[claims::ISSUED_AT, claims::NOT_BEFORE, claims::EXPIRATION_TIME] {
            if !token.claims().has(name) {
                return Err(error::ConstraintViolation::new(
                    Self::NAME,
                    format!("\"{}\" claim is missing", name),
                )
                .into());
            }
        }

        check_times(Self::NAME, token, self.clock.now(), self.leeway)
    }
}

#[cfg(test)]
mod tests {
    use color_eyre::Result;
    use tessera_clock::TestClock;

    use super::*;
    use crate::jwt::Builder;

    const NOW: u64 = 1_000_000;

    fn clock() -> TestClock {
        TestClock::new(UnixTime::from_secs(NOW))
    }

    fn at(secs: u64) -> UnixTime {
        UnixTime::from_secs(secs)
    }

    fn message(result: Result<(), error::ConstraintError>) -> String {
        match result {
            Err(err) => err.to_string(),
            Ok(()) => String::from("<satisfied>"),
        }
    }

    fn full_token(iat: u64, nbf: u64, exp: u64) -> Result<Token> {
        Ok(Builder::new()
            .issued_at(at(iat))
            .can_only_be_used_after(at(nbf))
            .expires_at(at(exp))
            .get_unsecured_token()?)
    }

    #[test]
    fn current_token_is_valid() -> Result<()> {
        let token = full_token(NOW - 10, NOW - 10, NOW + 10)?;
        LooseValidAt::new(clock(), Duration::ZERO).assert(&token)?;
        StrictValidAt::new(clock(), Duration::ZERO).assert(&token)?;
        Ok(())
    }

    #[test]
    fn missing_claims_impose_nothing_when_loose() -> Result<()> {
        let token = Builder::new().get_unsecured_token()?;
        LooseValidAt::new(clock(), Duration::ZERO).assert(&token)?;
        Ok(())
    }

    #[test]
    fn missing_claims_are_violations_when_strict() -> Result<()> {
        let strict = StrictValidAt::new(clock(), Duration::ZERO);

        let token = Builder::new().get_unsecured_token()?;
        assert_eq!(
            message(strict.assert(&token)),
            "StrictValidAt: \"iat\" claim is missing"
        );

        let token = Builder::new()
            .issued_at(at(NOW))
            .can_only_be_used_after(at(NOW))
            .get_unsecured_token()?;
        assert_eq!(
            message(strict.assert(&token)),
            "StrictValidAt: \"exp\" claim is missing"
        );
        Ok(())
    }

    #[test]
    fn expiration_instant_is_already_expired() -> Result<()> {
        let loose = LooseValidAt::new(clock(), Duration::ZERO);

        let token = full_token(NOW - 10, NOW - 10, NOW)?;
        assert_eq!(
            message(loose.assert(&token)),
            "LooseValidAt: the token is expired"
        );

        let token = full_token(NOW - 10, NOW - 10, NOW + 1)?;
        loose.assert(&token)?;
        Ok(())
    }

    #[test]
    fn leeway_extends_expiration() -> Result<()> {
        let token = full_token(NOW - 100, NOW - 100, NOW - 5)?;

        assert_eq!(
            message(LooseValidAt::new(clock(), Duration::from_secs(5)).assert(&token)),
            "LooseValidAt: the token is expired"
        );
        LooseValidAt::new(clock(), Duration::from_secs(6)).assert(&token)?;
        Ok(())
    }

    #[test]
    fn future_issue_and_not_before() -> Result<()> {
        let loose = LooseValidAt::new(clock(), Duration::from_secs(30));

        let token = full_token(NOW + 31, NOW, NOW + 100)?;
        assert_eq!(
            message(loose.assert(&token)),
            "LooseValidAt: the token was issued in the future"
        );

        let token = full_token(NOW, NOW + 31, NOW + 100)?;
        assert_eq!(
            message(loose.assert(&token)),
            "LooseValidAt: the token cannot be used yet"
        );

        let token = full_token(NOW + 30, NOW + 30, NOW + 100)?;
        loose.assert(&token)?;
        Ok(())
    }

    #[test]
    fn clock_is_read_on_every_check() -> Result<()> {
        let token = full_token(NOW - 10, NOW - 10, NOW + 10)?;
        let mut clock = clock();
        assert!(LooseValidAt::new(&clock, Duration::ZERO).assert(&token).is_ok());

        clock.advance(Duration::from_secs(10));
        assert!(LooseValidAt::new(&clock, Duration::ZERO).assert(&token).is_err());
        Ok(())
    }

    #[test]
    fn microsecond_precision_is_respected() -> Result<()> {
        let token = Builder::new()
            .expires_at(UnixTime::from_micros(NOW * 1_000_000 + 1))
            .get_unsecured_token()?;
        LooseValidAt::new(clock(), Duration::ZERO).assert(&token)?;

        let later = TestClock::new(UnixTime::from_micros(NOW * 1_000_000 + 1));
        assert!(LooseValidAt::new(later, Duration::ZERO).assert(&token).is_err());
        Ok(())
    }
}
