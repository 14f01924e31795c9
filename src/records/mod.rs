//! Purpose: Concrete SharpSpring record schemas.
//! Exports: One struct per CRM entity plus `LeadStatus`.
//! Role: Declarations only; behavior comes from `core::record` traits.
//! Invariants: Field lists mirror the server's object schema names exactly.
//! Invariants: Only accounts, leads, and opportunities carry custom fields.
use crate::core::attributes::AttributeBag;
use crate::core::custom::CustomAttributeBag;
use crate::core::record::{FromAttributes, HasCustomAttributes, Record, RecordKind};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Shared trait impls: Default, Display (json), serde via the attribute map.
// ---------------------------------------------------------------------------
macro_rules! record_common {
    ($name:ident) => {
        impl Default for $name {
            fn default() -> Self {
                <Self as Record>::blank()
            }
        }

        impl FromAttributes for $name {
            fn from_attributes(attributes: Map<String, Value>) -> Self {
                <Self as Record>::make(attributes)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.to_json())
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                self.to_map().serialize(serializer)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let attributes = Map::<String, Value>::deserialize(deserializer)?;
                Ok(<Self as Record>::make(attributes))
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Fixed-schema records: unknown attributes are dropped.
// ---------------------------------------------------------------------------
macro_rules! fixed_record {
    (
        $(#[$attr:meta])*
        $name:ident => $kind:ident [$($field:literal),+ $(,)?]
    ) => {
        $(#[$attr])*
        #[derive(Clone, Debug, PartialEq)]
        pub struct $name {
            attributes: AttributeBag,
        }

        impl Record for $name {
            const KIND: RecordKind = RecordKind::$kind;
            const FIELDS: &'static [&'static str] = &[$($field),+];

            fn blank() -> Self {
                Self {
                    attributes: AttributeBag::declare(Self::FIELDS),
                }
            }

            fn attributes(&self) -> &AttributeBag {
                &self.attributes
            }

            fn attributes_mut(&mut self) -> &mut AttributeBag {
                &mut self.attributes
            }
        }

        record_common!($name);
    };
}

// ---------------------------------------------------------------------------
// Custom-capable records: unknown attributes land in the custom tier.
// ---------------------------------------------------------------------------
macro_rules! custom_record {
    (
        $(#[$attr:meta])*
        $name:ident => $kind:ident [$($field:literal),+ $(,)?]
        $(nullable [$($nullable:literal),+ $(,)?])?
    ) => {
        $(#[$attr])*
        #[derive(Clone, Debug, PartialEq)]
        pub struct $name {
            attributes: AttributeBag,
            custom: CustomAttributeBag,
        }

        impl Record for $name {
            const KIND: RecordKind = RecordKind::$kind;
            const FIELDS: &'static [&'static str] = &[$($field),+];
            $(const NULLABLE: &'static [&'static str] = &[$($nullable),+];)?

            fn blank() -> Self {
                Self {
                    attributes: AttributeBag::declare(Self::FIELDS),
                    custom: CustomAttributeBag::new(),
                }
            }

            fn attributes(&self) -> &AttributeBag {
                &self.attributes
            }

            fn attributes_mut(&mut self) -> &mut AttributeBag {
                &mut self.attributes
            }

            fn custom_attributes(&self) -> Option<&CustomAttributeBag> {
                Some(&self.custom)
            }

            fn custom_attributes_mut(&mut self) -> Option<&mut CustomAttributeBag> {
                Some(&mut self.custom)
            }
        }

        impl HasCustomAttributes for $name {
            fn custom(&self) -> &CustomAttributeBag {
                &self.custom
            }

            fn custom_mut(&mut self) -> &mut CustomAttributeBag {
                &mut self.custom
            }
        }

        record_common!($name);
    };
}

custom_record! {
    /// A company the account owner does business with.
    Account => Account [
        "id",
        "ownerID",
        "accountName",
        "industry",
        "phone",
        "annualRevenue",
        "numberOfEmployees",
        "website",
        "yearStarted",
        "fax",
        "billingCity",
        "billingCountry",
        "billingPostalCode",
        "billingState",
        "billingStreetAddress",
        "shippingCity",
        "shippingCountry",
        "shippingPostalCode",
        "shippingState",
        "shippingStreetAddress",
    ]
}

fixed_record! {
    Campaign => Campaign [
        "id",
        "campaignName",
        "campaignType",
        "campaignAlias",
        "campaignOrigin",
        "qty",
        "price",
        "goal",
        "otherCosts",
        "startDate",
        "endDate",
        "isActive",
    ]
}

fixed_record! {
    /// A company profile managed by the authenticated agency account.
    Client => Client [
        "id",
        "companyName",
        "streetAddress",
        "zipCode",
        "country",
        "state",
        "city",
    ]
}

fixed_record! {
    /// A stage of the opportunity pipeline.
    DealStage => DealStage [
        "id",
        "dealStageName",
        "description",
        "defaultProbability",
        "weight",
        "isEditable",
    ]
}

fixed_record! {
    Email => Email [
        "id",
        "html",
        "emailName",
        "subject",
        "fromName",
        "fromEmail",
        "replyTo",
        "unsubCategory",
        "contactManager",
        "repeatable",
        "fromLeadOwner",
    ]
}

fixed_record! {
    /// Summary row returned by the email listing call.
    EmailListing => EmailListing [
        "id",
        "createTimestamp",
        "title",
        "subject",
        "thumbnail",
    ]
}

fixed_record! {
    /// Metadata describing a (possibly custom) field of a record type.
    Field => Field [
        "id",
        "relationship",
        "systemName",
        "label",
        "source",
        "dataType",
        "dataLength",
        "isRequired",
        "isCustom",
        "isActive",
        "isAvailableInContactManager",
        "isEditableInContactManager",
        "isAvailableInForms",
    ]
}

custom_record! {
    Lead => Lead [
        "id",
        "accountID",
        "ownerID",
        "campaignID",
        "leadStatus",
        "leadScore",
        "leadScoreWeighted",
        "persona",
        "active",
        "firstName",
        "lastName",
        "emailAddress",
        "companyName",
        "title",
        "street",
        "city",
        "country",
        "state",
        "zipcode",
        "website",
        "phoneNumber",
        "trackingID",
        "officePhoneNumber",
        "phoneNumberExtension",
        "mobilePhoneNumber",
        "faxNumber",
        "description",
        "industry",
        "isUnsubscribed",
        "updateTimestamp",
        "createTimestamp",
    ]
}

fixed_record! {
    /// A static or active contact list.
    List => List [
        "id",
        "name",
        "memberCount",
        "removedCount",
        "createTimestamp",
        "description",
    ]
}

fixed_record! {
    ListMember => ListMember ["id", "listID", "memberID", "isRemoved"]
}

fixed_record! {
    ListTag => ListTag ["id", "label", "objectType"]
}

custom_record! {
    Opportunity => Opportunity [
        "id",
        "ownerID",
        "dealStageID",
        "accountID",
        "campaignID",
        "opportunityName",
        "probability",
        "amount",
        "isClosed",
        "isWon",
        "isActive",
        "closeDate",
        "originatingLeadID",
        "primaryLeadID",
    ]
    nullable ["opportunityName", "closeDate"]
}

fixed_record! {
    /// Association between an opportunity and one of its leads.
    OpportunityLead => OpportunityLead ["id", "opportunityID", "leadID"]
}

fixed_record! {
    UserProfile => UserProfile [
        "id",
        "firstName",
        "lastName",
        "displayName",
        "emailAddress",
        "isActive",
        "isReseller",
        "userTimezone",
        "phone",
    ]
}

/// Values accepted by a lead's `leadStatus` attribute.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    Open,
    Unqualified,
    Qualified,
    Contact,
    Customer,
}

impl LeadStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            LeadStatus::Open => "open",
            LeadStatus::Unqualified => "unqualified",
            LeadStatus::Qualified => "qualified",
            LeadStatus::Contact => "contact",
            LeadStatus::Customer => "customer",
        }
    }
}

impl From<LeadStatus> for Value {
    fn from(status: LeadStatus) -> Self {
        Value::from(status.as_str())
    }
}

impl Lead {
    pub fn status(&self) -> Option<LeadStatus> {
        self.get_attribute("leadStatus")
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    pub fn set_status(&mut self, status: LeadStatus) {
        self.set_attribute("leadStatus", status.into());
    }
}

#[cfg(test)]
mod tests {
    use super::{Account, Campaign, Lead, LeadStatus, Opportunity};
    use crate::core::custom::{registry_test_lock, reset_aliases};
    use crate::core::record::{HasCustomAttributes, Record};
    use serde_json::{Map, Value, json};

    fn attrs(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test attributes must be an object"),
        }
    }

    #[test]
    fn lead_drops_null_non_nullable_fields() {
        let lead = Lead::make(attrs(json!({"firstName": "A", "leadScore": null})));
        assert_eq!(lead.filled_attributes(), attrs(json!({"firstName": "A"})));
    }

    #[test]
    fn opportunity_keeps_nullable_fields() {
        let opportunity =
            Opportunity::make(attrs(json!({"opportunityName": null, "amount": 100})));
        assert_eq!(
            opportunity.filled_attributes(),
            attrs(json!({"opportunityName": null, "closeDate": null, "amount": 100}))
        );
    }

    #[test]
    fn nullable_projections_split_declared_attributes() {
        let opportunity =
            Opportunity::make(attrs(json!({"opportunityName": "Renewal", "amount": 100})));
        assert_eq!(
            opportunity.nullable_attributes(),
            attrs(json!({"opportunityName": "Renewal", "closeDate": null}))
        );
        let rest = opportunity.non_nullable_attributes();
        assert_eq!(rest.get("amount"), Some(&json!(100)));
        assert!(!rest.contains_key("opportunityName"));
        assert!(!rest.contains_key("closeDate"));
        assert_eq!(
            rest.len() + 2,
            Opportunity::FIELDS.len(),
            "every declared key lands in exactly one projection"
        );
    }

    #[test]
    fn outbound_and_all_filled_projections_agree() {
        let lead = Lead::make(attrs(json!({"firstName": "A", "leadScore": null, "x_1": 3})));
        assert_eq!(lead.outbound_attributes(), lead.all_filled_attributes());
        assert_eq!(lead.outbound_attributes(), attrs(json!({"firstName": "A", "x_1": 3})));
    }

    mod single_nullable {
        use super::super::{
            AttributeBag, CustomAttributeBag, Deserialize, FromAttributes, HasCustomAttributes,
            Map, Record, RecordKind, Serialize, Value,
        };

        custom_record! {
            Deal => Opportunity ["id", "opportunityName", "amount"]
            nullable ["opportunityName"]
        }

        #[test]
        fn only_declared_nullable_key_is_kept_when_null() {
            let deal = Deal::make(
                serde_json::from_value(serde_json::json!({"opportunityName": null, "amount": 100}))
                    .expect("attrs"),
            );
            let expected: Map<String, Value> =
                serde_json::from_value(serde_json::json!({"opportunityName": null, "amount": 100}))
                    .expect("expected");
            assert_eq!(deal.filled_attributes(), expected);
            assert_eq!(deal.all_filled_attributes(), expected);
        }
    }

    #[test]
    fn fixed_record_ignores_unknown_attributes() {
        let campaign = Campaign::make(attrs(json!({"campaignName": "Spring", "bogus": 1})));
        assert_eq!(campaign.get_attribute("bogus"), None);
        assert!(!campaign.to_map().contains_key("bogus"));
        assert_eq!(campaign.filled_attributes(), attrs(json!({"campaignName": "Spring"})));
    }

    #[test]
    fn custom_record_routes_unknown_attributes_to_custom_tier() {
        let lead = Lead::make(attrs(json!({"firstName": "Ana", "shoe_size_5e2c1": 41})));
        assert_eq!(lead.custom().get("shoe_size_5e2c1"), Some(&json!(41)));
        assert_eq!(
            lead.all_filled_attributes(),
            attrs(json!({"firstName": "Ana", "shoe_size_5e2c1": 41}))
        );
    }

    #[test]
    fn custom_attributes_are_never_null_filtered() {
        let mut account = Account::blank();
        account.set_attribute("region_4a", Value::Null);
        assert_eq!(
            account.all_filled_attributes(),
            attrs(json!({"region_4a": null}))
        );
    }

    #[test]
    fn alias_reads_and_writes_reach_canonical_key() {
        let _guard = registry_test_lock();
        reset_aliases();
        Lead::map_custom_attribute("shoeSize", "shoe_size_5e2c1");

        let mut lead = Lead::blank();
        lead.set_attribute("shoeSize", json!(42));
        assert_eq!(lead.custom().get("shoe_size_5e2c1"), Some(&json!(42)));
        assert_eq!(lead.get_attribute("shoeSize"), Some(&json!(42)));
        assert_eq!(lead.get_attribute("shoe_size_5e2c1"), Some(&json!(42)));

        Lead::unmap_custom_attributes(&[]);
        assert_eq!(lead.get_attribute("shoeSize"), None);
        reset_aliases();
    }

    #[test]
    fn declared_write_survives_later_alias_onto_it() {
        let _guard = registry_test_lock();
        reset_aliases();
        let mut lead = Lead::blank();
        lead.set_attribute("firstName", json!("Ana"));
        Lead::map_custom_attribute("givenName", "firstName");

        assert_eq!(lead.get_attribute("firstName"), Some(&json!("Ana")));
        assert_eq!(lead.get_attribute("givenName"), Some(&json!("Ana")));
        reset_aliases();
    }

    #[test]
    fn alias_write_onto_declared_name_shadows_reads() {
        let _guard = registry_test_lock();
        reset_aliases();
        Lead::map_custom_attribute("givenName", "firstName");
        let mut lead = Lead::blank();
        lead.set_attribute("firstName", json!("declared"));
        lead.set_attribute("givenName", json!("custom"));

        assert_eq!(lead.attributes().get("firstName"), Some(&json!("declared")));
        assert_eq!(lead.get_attribute("firstName"), Some(&json!("custom")));
        reset_aliases();
    }

    #[test]
    fn replicate_clears_primary_key_and_copies_custom() {
        let lead = Lead::make(attrs(json!({"id": 99, "lastName": "Diaz", "tier_7": "gold"})));
        let copy = lead.replicate();
        assert_eq!(copy.key(), None);
        assert_eq!(copy.get_attribute("lastName"), Some(&json!("Diaz")));
        assert_eq!(copy.custom().get("tier_7"), Some(&json!("gold")));
        assert_eq!(lead.key(), Some(&json!(99)));

        let mut expected = lead.all_filled_attributes();
        expected.shift_remove("id");
        assert_eq!(copy.all_filled_attributes(), expected);
    }

    #[test]
    fn clear_custom_attributes_with_keys() {
        let mut account = Account::make(attrs(json!({"a_1": 1, "b_2": 2})));
        account.clear_custom_attributes(&["a_1"]);
        assert_eq!(account.custom_attribute_map(), attrs(json!({"b_2": 2})));
        account.clear_custom_attributes(&[]);
        assert!(account.custom().is_empty());
    }

    #[test]
    fn unset_attribute_nulls_declared_value() {
        let mut lead = Lead::make(attrs(json!({"city": "Valencia"})));
        assert!(lead.has_attribute("city"));
        lead.unset_attribute("city");
        assert!(!lead.has_attribute("city"));
        assert!(lead.to_map().contains_key("city"));
    }

    #[test]
    fn make_from_json_rejects_non_objects() {
        let err = Lead::make_from_json("[1, 2]").expect_err("array");
        assert_eq!(err.kind(), crate::core::error::ErrorKind::Cast);
        let err = Lead::make_from_json("{not json").expect_err("garbage");
        assert_eq!(err.kind(), crate::core::error::ErrorKind::Decode);
        let lead = Lead::make_from_json(r#"{"emailAddress":"a@b.co"}"#).expect("lead");
        assert_eq!(lead.get_attribute("emailAddress"), Some(&json!("a@b.co")));
    }

    #[test]
    fn lead_status_round_trips_through_attribute() {
        let mut lead = Lead::blank();
        lead.set_status(LeadStatus::Qualified);
        assert_eq!(lead.get_attribute("leadStatus"), Some(&json!("qualified")));
        assert_eq!(lead.status(), Some(LeadStatus::Qualified));
    }

    #[test]
    fn serde_uses_full_attribute_map() {
        let lead = Lead::make(attrs(json!({"firstName": "Ana", "pet_3": "cat"})));
        let value = serde_json::to_value(&lead).expect("serialize");
        assert_eq!(value["firstName"], json!("Ana"));
        assert_eq!(value["pet_3"], json!("cat"));
        assert_eq!(value["lastName"], Value::Null);

        let back: Lead = serde_json::from_value(value).expect("deserialize");
        assert_eq!(back, lead);
    }
}
