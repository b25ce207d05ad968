//! Address verification — turning a reported address into recorded visits.
//!
//! A report names a top-level region (province) and a child region (district)
//! plus the free-text address it came from. Verification succeeds only if the
//! district really belongs to the province; on success one visit is counted
//! for the district and one for the province, in that order, as a single unit
//! of work.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
  Error, Result,
  region::Region,
  store::{RegionHierarchy, VisitStore},
  user::UserId,
  visit::VisitRecord,
};

// ─── Input ───────────────────────────────────────────────────────────────────

/// An address as reported by a client's geocoder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressReport {
  /// Top-level region name (province, metropolitan city).
  pub province:     Option<String>,
  /// Child region name (district, city).
  pub district:     Option<String>,
  /// Full address text. Only used for diagnostics.
  pub full_address: Option<String>,
}

impl AddressReport {
  pub fn new(
    province: impl Into<String>,
    district: impl Into<String>,
    full_address: impl Into<String>,
  ) -> Self {
    Self {
      province:     Some(province.into()),
      district:     Some(district.into()),
      full_address: Some(full_address.into()),
    }
  }

  /// Return the province and district names if both are non-blank.
  ///
  /// Names are returned as given; trimming is only used to detect blanks.
  pub fn names(&self) -> std::result::Result<(&str, &str), Rejection> {
    let province = self
      .province
      .as_deref()
      .filter(|p| !p.trim().is_empty())
      .ok_or(Rejection::MissingProvince)?;
    let district = self
      .district
      .as_deref()
      .filter(|d| !d.trim().is_empty())
      .ok_or(Rejection::MissingDistrict)?;
    Ok((province, district))
  }

  fn address_for_log(&self) -> &str { self.full_address.as_deref().unwrap_or("<none>") }
}

// ─── Outcomes ────────────────────────────────────────────────────────────────

/// Why a report could not be verified. These are expected outcomes, not
/// errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Rejection {
  MissingProvince,
  MissingDistrict,
  UnknownProvince { province: String },
  /// The district does not exist under the named province. It may still
  /// exist under a different one.
  UnknownDistrict { province: String, district: String },
}

impl fmt::Display for Rejection {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::MissingProvince => f.write_str("province is missing"),
      Self::MissingDistrict => f.write_str("district is missing"),
      Self::UnknownProvince { province } => write!(f, "unknown province {province:?}"),
      Self::UnknownDistrict { province, district } => {
        write!(f, "{district:?} is not a district of {province:?}")
      }
    }
  }
}

/// A report resolved against the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAddress {
  pub province: Region,
  pub district: Region,
}

pub type Resolution = std::result::Result<ResolvedAddress, Rejection>;

/// The result of [`verify_visit`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Verification {
  Verified {
    province: Region,
    district: Region,
    /// The district record followed by the province record, after counting.
    visits:   Vec<VisitRecord>,
  },
  Rejected(Rejection),
}

impl Verification {
  pub fn is_verified(&self) -> bool { matches!(self, Self::Verified { .. }) }
}

// ─── Operations ──────────────────────────────────────────────────────────────

/// Resolve a report to a (province, district) pair without recording anything.
pub async fn resolve_address<H: RegionHierarchy>(
  hierarchy: &H,
  report: &AddressReport,
) -> Result<Resolution> {
  let (province_name, district_name) = match report.names() {
    Ok(names) => names,
    Err(rejection) => return Ok(Err(rejection)),
  };

  let Some(province) = hierarchy
    .find_top_level_by_name(province_name)
    .await
    .map_err(Error::store)?
  else {
    return Ok(Err(Rejection::UnknownProvince { province: province_name.to_owned() }));
  };

  let Some(district) = hierarchy
    .find_child_by_name_and_parent(district_name, province.region_id)
    .await
    .map_err(Error::store)?
  else {
    return Ok(Err(Rejection::UnknownDistrict {
      province: province_name.to_owned(),
      district: district_name.to_owned(),
    }));
  };

  Ok(Ok(ResolvedAddress { province, district }))
}

/// Verify `report` for `user_id` and, on success, count one visit to the
/// district and one to its province.
///
/// Blank names are rejected before the store is consulted. An unknown user is
/// an [`Error::UserNotFound`]; unknown or mismatched region names are a
/// [`Verification::Rejected`].
pub async fn verify_visit<S: VisitStore>(
  store: &S,
  user_id: UserId,
  report: &AddressReport,
) -> Result<Verification> {
  info!(%user_id, address = report.address_for_log(), "verifying visit");

  if let Err(rejection) = report.names() {
    warn!(%user_id, address = report.address_for_log(), %rejection, "visit rejected");
    return Ok(Verification::Rejected(rejection));
  }

  if !store.user_exists(user_id).await.map_err(Error::store)? {
    return Err(Error::UserNotFound(user_id));
  }

  let ResolvedAddress { province, district } = match resolve_address(store, report).await? {
    Ok(resolved) => resolved,
    Err(rejection) => {
      warn!(%user_id, address = report.address_for_log(), %rejection, "visit rejected");
      return Ok(Verification::Rejected(rejection));
    }
  };

  let visits = store
    .record_visits(user_id, &[district.region_id, province.region_id])
    .await
    .map_err(Error::store)?;

  info!(
    %user_id,
    province = %province.name,
    district = %district.name,
    "visit verified and recorded"
  );

  Ok(Verification::Verified { province, district, visits })
}

#[cfg(test)]
mod tests {
  use super::*;

  fn report(province: Option<&str>, district: Option<&str>) -> AddressReport {
    AddressReport {
      province:     province.map(str::to_owned),
      district:     district.map(str::to_owned),
      full_address: None,
    }
  }

  #[test]
  fn names_requires_both_parts() {
    assert_eq!(report(None, Some("Suwon")).names(), Err(Rejection::MissingProvince));
    assert_eq!(report(Some("Gyeonggi"), None).names(), Err(Rejection::MissingDistrict));
    assert_eq!(report(None, None).names(), Err(Rejection::MissingProvince));
  }

  #[test]
  fn whitespace_only_counts_as_missing() {
    assert_eq!(report(Some("   "), Some("Suwon")).names(), Err(Rejection::MissingProvince));
    assert_eq!(report(Some("Gyeonggi"), Some("\t\n")).names(), Err(Rejection::MissingDistrict));
  }

  #[test]
  fn names_are_not_normalised() {
    let r = report(Some(" Gyeonggi"), Some("Suwon "));
    assert_eq!(r.names(), Ok((" Gyeonggi", "Suwon ")));
  }

  #[test]
  fn rejection_serialises_with_reason_tag() {
    let rejection = Rejection::UnknownDistrict {
      province: "Gyeonggi".into(),
      district: "Busan".into(),
    };
    let json = serde_json::to_value(&rejection).unwrap();
    assert_eq!(
      json,
      serde_json::json!({ "reason": "unknown_district", "province": "Gyeonggi", "district": "Busan" })
    );
  }
}
