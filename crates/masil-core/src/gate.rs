//! Region gate — visit preconditions for article authorship.
//!
//! An article may only be written about a region its author has verified a
//! visit to. [`has_visited`] is the single boolean check; [`check_article_places`]
//! applies it to an article's place list.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
  Error, Result,
  region::{Region, RegionId},
  store::VisitStore,
  user::UserId,
  verify::{AddressReport, Rejection, ResolvedAddress, resolve_address},
};

/// Whether `user_id` holds a visit record for exactly `region_id`.
pub async fn has_visited<S: VisitStore>(
  store: &S,
  user_id: UserId,
  region_id: RegionId,
) -> Result<bool> {
  store.has_visited(user_id, region_id).await.map_err(Error::store)
}

/// Why an article's places do not satisfy the gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ArticleDenial {
  NoPlaces,
  /// The place at `index` does not resolve to a known district.
  Unresolvable { index: usize, rejection: Rejection },
  /// Places resolve to more than one district.
  MixedRegions { first: Region, other: Region },
  /// The author has never verified a visit to the article's district.
  NotVisited { region: Region },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ArticleGate {
  /// The article belongs to `region`.
  Allowed { region: Region },
  Denied(ArticleDenial),
}

impl ArticleGate {
  pub fn is_allowed(&self) -> bool { matches!(self, Self::Allowed { .. }) }
}

/// Check an article's places for `user_id`.
///
/// Every place must resolve to the same district, and the author must have
/// visited that district.
pub async fn check_article_places<S: VisitStore>(
  store: &S,
  user_id: UserId,
  places: &[AddressReport],
) -> Result<ArticleGate> {
  if !store.user_exists(user_id).await.map_err(Error::store)? {
    return Err(Error::UserNotFound(user_id));
  }

  let mut article_region: Option<Region> = None;
  for (index, place) in places.iter().enumerate() {
    let district = match resolve_address(store, place).await? {
      Ok(ResolvedAddress { district, .. }) => district,
      Err(rejection) => {
        return Ok(deny(user_id, ArticleDenial::Unresolvable { index, rejection }));
      }
    };

    match &article_region {
      None => article_region = Some(district),
      Some(first) if first.region_id == district.region_id => {}
      Some(first) => {
        return Ok(deny(user_id, ArticleDenial::MixedRegions {
          first: first.clone(),
          other: district,
        }));
      }
    }
  }

  let Some(region) = article_region else {
    return Ok(deny(user_id, ArticleDenial::NoPlaces));
  };

  if !has_visited(store, user_id, region.region_id).await? {
    return Ok(deny(user_id, ArticleDenial::NotVisited { region }));
  }

  debug!(%user_id, region = %region.name, "article places allowed");
  Ok(ArticleGate::Allowed { region })
}

fn deny(user_id: UserId, denial: ArticleDenial) -> ArticleGate {
  warn!(%user_id, ?denial, "article places denied");
  ArticleGate::Denied(denial)
}
