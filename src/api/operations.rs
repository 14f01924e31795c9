//! Purpose: Typed per-entity operations over the dispatcher.
//! Exports: Inherent methods on `SharpspringClient`.
//! Role: Maps each API method to its params shape and result member.
//! Invariants: Batch inputs go out as `{objects: [...]}`; custom attributes ride along.
//! Invariants: Singular lookups return `None` for an empty result, never a blank record.
#![allow(clippy::result_large_err)]

use super::client::{ApiResult, SharpspringClient, objects_param};
use super::query::{DateRange, Query};
use super::transport::Transport;
use crate::core::results::{CreateResult, DeleteResult, UpdateResult, truthy};
use crate::records::{
    Account, Campaign, Client, DealStage, Email, EmailListing, Field, Lead, List, ListMember,
    ListTag, Opportunity, OpportunityLead, UserProfile,
};
use serde_json::{Map, Value};

// Accounts
impl<T: Transport> SharpspringClient<T> {
    pub fn create_accounts(&mut self, accounts: &[Account]) -> ApiResult<Vec<CreateResult>> {
        self.create_records("createAccounts", accounts)
    }

    pub fn create_account(&mut self, account: &Account) -> ApiResult<Option<CreateResult>> {
        first(self.create_accounts(std::slice::from_ref(account)))
    }

    pub fn delete_accounts(&mut self, ids: &[u64]) -> ApiResult<Vec<DeleteResult>> {
        self.delete_by_ids("deleteAccounts", ids)
    }

    pub fn get_account(&mut self, id: u64) -> ApiResult<Option<Account>> {
        self.get_by_id("getAccount", id, "account")
    }

    pub fn get_accounts(&mut self, query: &Query) -> ApiResult<Vec<Account>> {
        self.query("getAccounts", query, "account")
    }

    pub fn get_accounts_date_range(&mut self, range: &DateRange) -> ApiResult<Vec<Account>> {
        self.date_range("getAccountsDateRange", range, "account")
    }

    pub fn update_accounts(&mut self, accounts: &[Account]) -> ApiResult<Vec<UpdateResult>> {
        self.update_records("updateAccounts", accounts)
    }

    pub fn update_account(&mut self, account: &Account) -> ApiResult<Option<UpdateResult>> {
        first(self.update_accounts(std::slice::from_ref(account)))
    }
}

// Campaigns
impl<T: Transport> SharpspringClient<T> {
    pub fn create_campaigns(&mut self, campaigns: &[Campaign]) -> ApiResult<Vec<CreateResult>> {
        self.create_records("createCampaigns", campaigns)
    }

    pub fn delete_campaigns(&mut self, ids: &[u64]) -> ApiResult<Vec<DeleteResult>> {
        self.delete_by_ids("deleteCampaigns", ids)
    }

    pub fn get_campaign(&mut self, id: u64) -> ApiResult<Option<Campaign>> {
        self.get_by_id("getCampaign", id, "campaign")
    }

    pub fn get_campaigns(&mut self, query: &Query) -> ApiResult<Vec<Campaign>> {
        self.query("getCampaigns", query, "campaign")
    }

    pub fn get_campaigns_date_range(&mut self, range: &DateRange) -> ApiResult<Vec<Campaign>> {
        self.date_range("getCampaignsDateRange", range, "campaign")
    }

    pub fn update_campaigns(&mut self, campaigns: &[Campaign]) -> ApiResult<Vec<UpdateResult>> {
        self.update_records("updateCampaigns", campaigns)
    }
}

// Clients (company profiles managed by an agency account)
impl<T: Transport> SharpspringClient<T> {
    pub fn get_clients(&mut self) -> ApiResult<Vec<Client>> {
        self.fetch_many("getClients", Map::new(), "getAllcompanyProfileManagedBys")
    }
}

// Deal stages
impl<T: Transport> SharpspringClient<T> {
    pub fn create_deal_stages(&mut self, stages: &[DealStage]) -> ApiResult<Vec<CreateResult>> {
        self.create_records("createDealStages", stages)
    }

    pub fn delete_deal_stages(&mut self, ids: &[u64]) -> ApiResult<Vec<DeleteResult>> {
        self.delete_by_ids("deleteDealStages", ids)
    }

    pub fn get_deal_stage(&mut self, id: u64) -> ApiResult<Option<DealStage>> {
        self.get_by_id("getDealStage", id, "dealStage")
    }

    pub fn get_deal_stages(&mut self, query: &Query) -> ApiResult<Vec<DealStage>> {
        self.query("getDealStages", query, "dealStage")
    }

    pub fn get_deal_stages_date_range(&mut self, range: &DateRange) -> ApiResult<Vec<DealStage>> {
        self.date_range("getDealStagesDateRange", range, "dealStage")
    }

    pub fn update_deal_stages(&mut self, stages: &[DealStage]) -> ApiResult<Vec<UpdateResult>> {
        self.update_records("updateDealStages", stages)
    }
}

// Emails
impl<T: Transport> SharpspringClient<T> {
    pub fn create_emails(&mut self, emails: &[Email]) -> ApiResult<Vec<CreateResult>> {
        self.create_records("createEmail", emails)
    }

    pub fn delete_emails(&mut self, ids: &[u64]) -> ApiResult<Vec<DeleteResult>> {
        self.delete_by_ids("deleteEmail", ids)
    }

    pub fn get_email(&mut self, id: u64) -> ApiResult<Option<Email>> {
        self.get_by_id("getEmail", id, "email")
    }

    pub fn get_email_listing(&mut self, query: &Query) -> ApiResult<Vec<EmailListing>> {
        self.query("getEmailListing", query, "getAllemailListings")
    }

    pub fn update_emails(&mut self, emails: &[Email]) -> ApiResult<Vec<UpdateResult>> {
        self.update_records("updateEmail", emails)
    }
}

// Fields
impl<T: Transport> SharpspringClient<T> {
    pub fn create_fields(&mut self, fields: &[Field]) -> ApiResult<Vec<CreateResult>> {
        self.create_records("createFields", fields)
    }

    /// Fields are deleted by system name, not id.
    pub fn delete_fields(&mut self, system_names: &[&str]) -> ApiResult<Vec<DeleteResult>> {
        let params = objects_param(system_names.iter().map(|name| {
            let mut object = Map::new();
            object.insert("systemName".to_string(), Value::from(*name));
            object
        }));
        self.fetch_many("deleteFields", params, "deletes")
    }

    /// Lists system and custom fields; use `systemName` as the key for custom attributes.
    pub fn get_fields(&mut self, query: &Query) -> ApiResult<Vec<Field>> {
        self.query("getFields", query, "field")
    }

    pub fn update_fields(&mut self, fields: &[Field]) -> ApiResult<Vec<UpdateResult>> {
        self.update_records("updateFields", fields)
    }
}

// List tags
impl<T: Transport> SharpspringClient<T> {
    pub fn get_list_tags(&mut self) -> ApiResult<Vec<ListTag>> {
        self.fetch_many("getListTags", Map::new(), "getAllgetListTagss")
    }
}

// Leads
impl<T: Transport> SharpspringClient<T> {
    pub fn create_leads(&mut self, leads: &[Lead]) -> ApiResult<Vec<CreateResult>> {
        self.create_records("createLeads", leads)
    }

    pub fn create_lead(&mut self, lead: &Lead) -> ApiResult<Option<CreateResult>> {
        first(self.create_leads(std::slice::from_ref(lead)))
    }

    pub fn delete_leads(&mut self, ids: &[u64]) -> ApiResult<Vec<DeleteResult>> {
        self.delete_by_ids("deleteLeads", ids)
    }

    pub fn get_lead(&mut self, id: u64) -> ApiResult<Option<Lead>> {
        self.get_by_id("getLead", id, "lead")
    }

    /// Honors the query's `fields` projection.
    pub fn get_leads(&mut self, query: &Query) -> ApiResult<Vec<Lead>> {
        self.fetch_many("getLeads", query.to_params(true), "lead")
    }

    pub fn get_leads_date_range(&mut self, range: &DateRange) -> ApiResult<Vec<Lead>> {
        self.fetch_many("getLeadsDateRange", range.to_params(true), "lead")
    }

    pub fn get_lead_by_email(&mut self, email_address: &str) -> ApiResult<Option<Lead>> {
        let leads = self.get_leads(&Query::new().filter("emailAddress", email_address))?;
        Ok(leads.into_iter().next())
    }

    /// Registers a webhook url for lead changes; returns the server's success flag.
    pub fn subscribe_to_lead_updates(&mut self, url: &str) -> ApiResult<bool> {
        let mut params = Map::new();
        params.insert("url".to_string(), Value::from(url));
        let result = self.execute("subscribeToLeadUpdates", params)?;
        Ok(result.get("success").is_some_and(truthy))
    }

    pub fn update_leads(&mut self, leads: &[Lead]) -> ApiResult<Vec<UpdateResult>> {
        self.update_records("updateLeads", leads)
    }

    pub fn update_lead(&mut self, lead: &Lead) -> ApiResult<Option<UpdateResult>> {
        first(self.update_leads(std::slice::from_ref(lead)))
    }

    /// Like `update_leads`, but leads may be matched by email address instead of id.
    pub fn update_leads_v2(&mut self, leads: &[Lead]) -> ApiResult<Vec<UpdateResult>> {
        self.update_records("updateLeadsV2", leads)
    }
}

// Lists and memberships
impl<T: Transport> SharpspringClient<T> {
    pub fn create_lists(&mut self, lists: &[List]) -> ApiResult<Vec<CreateResult>> {
        self.create_records("createList", lists)
    }

    pub fn create_list(&mut self, list: &List) -> ApiResult<Option<CreateResult>> {
        first(self.create_lists(std::slice::from_ref(list)))
    }

    pub fn delete_lists(&mut self, ids: &[u64]) -> ApiResult<Vec<DeleteResult>> {
        self.delete_by_ids("deleteList", ids)
    }

    pub fn get_active_lists(&mut self, query: &Query) -> ApiResult<Vec<List>> {
        self.query("getActiveLists", query, "activeList")
    }

    pub fn get_active_list(&mut self, id: u64) -> ApiResult<Option<List>> {
        let lists = self.get_active_lists(&Query::new().filter("id", id))?;
        Ok(lists.into_iter().next())
    }

    pub fn add_list_member(
        &mut self,
        list_id: u64,
        member_id: u64,
    ) -> ApiResult<Option<CreateResult>> {
        self.add_member("addListMember", list_id, "memberID", Value::from(member_id))
    }

    pub fn add_list_member_email_address(
        &mut self,
        list_id: u64,
        email_address: &str,
    ) -> ApiResult<Option<CreateResult>> {
        self.add_member(
            "addListMemberEmailAddress",
            list_id,
            "emailAddress",
            Value::from(email_address),
        )
    }

    /// Bulk variant; the server accepts up to 500 associations per call.
    pub fn add_list_members(
        &mut self,
        list_id: u64,
        member_id: u64,
    ) -> ApiResult<Option<CreateResult>> {
        self.add_member("addListMembers", list_id, "memberID", Value::from(member_id))
    }

    pub fn add_list_members_email_address(
        &mut self,
        list_id: u64,
        email_address: &str,
    ) -> ApiResult<Option<CreateResult>> {
        self.add_member(
            "addListMembersEmailAddress",
            list_id,
            "emailAddress",
            Value::from(email_address),
        )
    }

    /// Lists a contact belongs to; only the query's `where` clause is sent.
    pub fn get_contact_list_memberships(&mut self, query: &Query) -> ApiResult<Vec<ListMember>> {
        let mut params = Map::new();
        params.insert(
            "where".to_string(),
            Value::Object(query.where_clause().clone()),
        );
        self.fetch_many("getContactListMemberships", params, "listMember")
    }

    fn add_member(
        &mut self,
        method: &str,
        list_id: u64,
        member_key: &str,
        member: Value,
    ) -> ApiResult<Option<CreateResult>> {
        let mut params = Map::new();
        params.insert("listID".to_string(), Value::from(list_id));
        params.insert(member_key.to_string(), member);
        self.fetch_first(method, params, "creates")
    }
}

// Opportunities
impl<T: Transport> SharpspringClient<T> {
    pub fn create_opportunities(
        &mut self,
        opportunities: &[Opportunity],
    ) -> ApiResult<Vec<CreateResult>> {
        self.create_records("createOpportunities", opportunities)
    }

    pub fn create_opportunity(
        &mut self,
        opportunity: &Opportunity,
    ) -> ApiResult<Option<CreateResult>> {
        first(self.create_opportunities(std::slice::from_ref(opportunity)))
    }

    pub fn delete_opportunities(&mut self, ids: &[u64]) -> ApiResult<Vec<DeleteResult>> {
        self.delete_by_ids("deleteOpportunities", ids)
    }

    pub fn get_opportunity(&mut self, id: u64) -> ApiResult<Option<Opportunity>> {
        self.get_by_id("getOpportunity", id, "opportunity")
    }

    pub fn get_opportunities(&mut self, query: &Query) -> ApiResult<Vec<Opportunity>> {
        self.query("getOpportunities", query, "opportunity")
    }

    pub fn get_opportunities_date_range(
        &mut self,
        range: &DateRange,
    ) -> ApiResult<Vec<Opportunity>> {
        self.date_range("getOpportunitiesDateRange", range, "opportunity")
    }

    pub fn update_opportunities(
        &mut self,
        opportunities: &[Opportunity],
    ) -> ApiResult<Vec<UpdateResult>> {
        self.update_records("updateOpportunities", opportunities)
    }

    pub fn update_opportunity(
        &mut self,
        opportunity: &Opportunity,
    ) -> ApiResult<Option<UpdateResult>> {
        first(self.update_opportunities(std::slice::from_ref(opportunity)))
    }
}

// Opportunity leads
impl<T: Transport> SharpspringClient<T> {
    pub fn create_opportunity_leads(
        &mut self,
        links: &[OpportunityLead],
    ) -> ApiResult<Vec<CreateResult>> {
        self.create_records("createOpportunityLeads", links)
    }

    pub fn delete_opportunity_leads(&mut self, ids: &[u64]) -> ApiResult<Vec<DeleteResult>> {
        self.delete_by_ids("deleteOpportunityLeads", ids)
    }

    pub fn get_opportunity_lead(&mut self, id: u64) -> ApiResult<Option<OpportunityLead>> {
        self.get_by_id("getOpportunityLead", id, "opportunityLead")
    }

    pub fn get_opportunity_leads(&mut self, query: &Query) -> ApiResult<Vec<OpportunityLead>> {
        self.query("getOpportunityLeads", query, "getWhereopportunityLeads")
    }

    pub fn get_opportunity_leads_date_range(
        &mut self,
        range: &DateRange,
    ) -> ApiResult<Vec<OpportunityLead>> {
        self.date_range("getOpportunityLeadsDateRange", range, "opportunityLead")
    }
}

// User profiles
impl<T: Transport> SharpspringClient<T> {
    pub fn get_user_profiles(&mut self, query: &Query) -> ApiResult<Vec<UserProfile>> {
        self.query("getUserProfiles", query, "userProfile")
    }
}

fn first<R>(results: ApiResult<Vec<R>>) -> ApiResult<Option<R>> {
    results.map(|items| items.into_iter().next())
}
