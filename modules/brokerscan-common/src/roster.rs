// Default broker roster. Callers inject their own roster into the scanner;
// this list is only the out-of-the-box configuration.

use crate::types::{BrokerDescriptor, RiskLevel};

pub const SKIP_TRACE: &str = "Skip Trace";
pub const PEOPLE_SEARCH: &str = "People Search";

pub fn default_roster() -> Vec<BrokerDescriptor> {
    use RiskLevel::*;

    vec![
        BrokerDescriptor::new(SKIP_TRACE, "https://www.truepeoplesearch.com", High, 1)
            .with_data_types(&[
                "Name",
                "Age",
                "Address",
                "Phone",
                "Email",
                "Relatives",
                "Associates",
            ]),
        BrokerDescriptor::new(PEOPLE_SEARCH, "https://www.fastpeoplesearch.com", High, 1)
            .with_data_types(&["Name", "Age", "Address", "Phone", "Email", "Relatives"]),
        BrokerDescriptor::new("Spokeo", "https://www.spokeo.com", High, 1)
            .with_data_types(&["Name", "Age", "Address", "Phone", "Email", "Relatives"]),
        BrokerDescriptor::new("Whitepages", "https://www.whitepages.com", High, 1)
            .with_data_types(&["Name", "Age", "Address", "Phone", "Relatives"]),
        BrokerDescriptor::new("BeenVerified", "https://www.beenverified.com", High, 1)
            .with_data_types(&["Name", "Age", "Address", "Phone", "Email", "Associates"]),
        BrokerDescriptor::new("Intelius", "https://www.intelius.com", High, 2)
            .with_data_types(&["Name", "Age", "Address", "Phone", "Relatives"]),
        BrokerDescriptor::new("Radaris", "https://radaris.com", High, 2)
            .with_data_types(&["Name", "Age", "Address", "Phone", "Relatives", "Associates"]),
        BrokerDescriptor::new("MyLife", "https://www.mylife.com", Medium, 2)
            .with_data_types(&["Name", "Age", "Address", "Relatives"]),
        BrokerDescriptor::new("PeopleFinders", "https://www.peoplefinders.com", Medium, 2)
            .with_data_types(&["Name", "Age", "Address", "Phone"]),
        BrokerDescriptor::new("USPhonebook", "https://www.usphonebook.com", Medium, 2)
            .with_data_types(&["Name", "Address", "Phone"]),
        BrokerDescriptor::new("ZabaSearch", "https://www.zabasearch.com", Medium, 3)
            .with_data_types(&["Name", "Age", "Address", "Phone"]),
        BrokerDescriptor::new("That's Them", "https://thatsthem.com", Medium, 3)
            .with_data_types(&["Name", "Address", "Phone", "Email"]),
        BrokerDescriptor::new("Nuwber", "https://nuwber.com", Low, 3)
            .with_data_types(&["Name", "Age", "Address"]),
        BrokerDescriptor::new("ClustrMaps", "https://clustrmaps.com", Low, 3)
            .with_data_types(&["Name", "Address"]),
    ]
}
