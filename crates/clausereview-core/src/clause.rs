//! The fixed catalogue of contract clause categories.
//!
//! Each of the 41 CUAD clause categories is paired with the question that the
//! extractive reader is asked. The question embeds the quoted category name and
//! a plain-language description of what the clause covers, which is the exact
//! phrasing the reader models were fine-tuned on.

use std::sync::OnceLock;

use serde::Serialize;

const QUESTION_PREFIX: &str = "Highlight the parts (if any) of this contract related to";
const QUESTION_SUFFIX: &str = "that should be reviewed by a lawyer. Details:";

/// `(category, details)` in catalogue order. Sorted at load time.
const CLAUSES: &[(&str, &str)] = &[
    ("Document Name", "The name of the contract"),
    ("Parties", "The two or more parties who signed the contract"),
    ("Agreement Date", "The date of the contract"),
    ("Effective Date", "The date when the contract is effective\u{a0}"),
    (
        "Expiration Date",
        "On what date will the contracts initial term expire?",
    ),
    (
        "Renewal Term",
        "What is the renewal term after the initial term expires? This includes automatic extensions and unilateral extensions with prior notice.",
    ),
    (
        "Notice Period To Terminate Renewal",
        "What is the notice period required to terminate renewal?",
    ),
    (
        "Governing Law",
        "Which state/countrys law governs the interpretation of the contract?",
    ),
    (
        "Most Favored Nation",
        "Is there a clause that if a third party gets better terms on the licensing or sale of technology/goods/services described in the contract, the buyer of such technology/goods/services under the contract shall be entitled to those better terms?",
    ),
    (
        "Non-Compete",
        "Is there a restriction on the ability of a party to compete with the counterparty or operate in a certain geography or business or technology sector?\u{a0}",
    ),
    (
        "Exclusivity",
        "Is there an exclusive dealing\u{a0} commitment with the counterparty? This includes a commitment to procure all “requirements” from one party of certain technology, goods, or services or a prohibition on licensing or selling technology, goods or services to third parties, or a prohibition on\u{a0} collaborating or working with other parties), whether during the contract or\u{a0} after the contract ends (or both).",
    ),
    (
        "No-Solicit Of Customers",
        "Is a party restricted from contracting or soliciting customers or partners of the counterparty, whether during the contract or after the contract ends (or both)?",
    ),
    (
        "Competitive Restriction Exception",
        "This category includes the exceptions or carveouts to Non-Compete, Exclusivity and No-Solicit of Customers above.",
    ),
    (
        "No-Solicit Of Employees",
        "Is there a restriction on a party’s soliciting or hiring employees and/or contractors from the\u{a0} counterparty, whether during the contract or after the contract ends (or both)?",
    ),
    (
        "Non-Disparagement",
        "Is there a requirement on a party not to disparage the counterparty?",
    ),
    (
        "Termination For Convenience",
        "Can a party terminate this\u{a0} contract without cause (solely by giving a notice and allowing a waiting\u{a0} period to expire)?",
    ),
    (
        "Rofr/Rofo/Rofn",
        "Is there a clause granting one party a right of first refusal, right of first offer or right of first negotiation to purchase, license, market, or distribute equity interest, technology, assets, products or services?",
    ),
    (
        "Change Of Control",
        "Does one party have the right to terminate or is consent or notice required of the counterparty if such party undergoes a change of control, such as a merger, stock sale, transfer of all or substantially all of its assets or business, or assignment by operation of law?",
    ),
    (
        "Anti-Assignment",
        "Is consent or notice required of a party if the contract is assigned to a third party?",
    ),
    (
        "Revenue/Profit Sharing",
        "Is one party required to share revenue or profit with the counterparty for any technology, goods, or\u{a0}services?",
    ),
    (
        "Price Restrictions",
        "Is there a restriction on the\u{a0} ability of a party to raise or reduce prices of technology, goods, or\u{a0} services provided?",
    ),
    (
        "Minimum Commitment",
        "Is there a minimum order size or minimum amount or units per-time period that one party must buy from the counterparty under the contract?",
    ),
    (
        "Volume Restriction",
        "Is there a fee increase or consent requirement, etc. if one party’s use of the product/services exceeds certain threshold?",
    ),
    (
        "Ip Ownership Assignment",
        "Does intellectual property created\u{a0} by one party become the property of the counterparty, either per the terms of the contract or upon the occurrence of certain events?",
    ),
    (
        "Joint Ip Ownership",
        "Is there any clause providing for joint or shared ownership of intellectual property between the parties to the contract?",
    ),
    (
        "License Grant",
        "Does the contract contain a license granted by one party to its counterparty?",
    ),
    (
        "Non-Transferable License",
        "Does the contract limit the ability of a party to transfer the license being granted to a third party?",
    ),
    (
        "Affiliate License-Licensor",
        "Does the contract contain a license grant by affiliates of the licensor or that includes intellectual property of affiliates of the licensor?\u{a0}",
    ),
    (
        "Affiliate License-Licensee",
        "Does the contract contain a license grant to a licensee (incl. sublicensor) and the affiliates of such licensee/sublicensor?",
    ),
    (
        "Unlimited/All-You-Can-Eat-License",
        "Is there a clause granting one party an “enterprise,” “all you can eat” or unlimited usage license?",
    ),
    (
        "Irrevocable Or Perpetual License",
        "Does the contract contain a\u{a0} license grant that is irrevocable or perpetual?",
    ),
    (
        "Source Code Escrow",
        "Is one party required to deposit its source code into escrow with a third party, which can be released to the counterparty upon the occurrence of certain events (bankruptcy,\u{a0} insolvency, etc.)?",
    ),
    (
        "Post-Termination Services",
        "Is a party subject to obligations after the termination or expiration of a contract, including any post-termination transition, payment, transfer of IP, wind-down, last-buy, or similar commitments?",
    ),
    (
        "Audit Rights",
        "Does a party have the right to\u{a0} audit the books, records, or physical locations of the counterparty to ensure compliance with the contract?",
    ),
    (
        "Uncapped Liability",
        "Is a party’s liability uncapped upon the breach of its obligation in the contract? This also includes uncap liability for a particular type of breach such as IP infringement or breach of confidentiality obligation.",
    ),
    (
        "Cap On Liability",
        "Does the contract include a cap on liability upon the breach of a party’s obligation? This includes time limitation for the counterparty to bring claims or maximum amount for recovery.",
    ),
    (
        "Liquidated Damages",
        "Does the contract contain a clause that would award either party liquidated damages for breach or a fee upon the termination of a contract (termination fee)?",
    ),
    (
        "Warranty Duration",
        "What is the duration of any\u{a0} warranty against defects or errors in technology, products, or services\u{a0} provided under the contract?",
    ),
    (
        "Insurance",
        "Is there a requirement for insurance that must be maintained by one party for the benefit of the counterparty?",
    ),
    (
        "Covenant Not To Sue",
        "Is a party restricted from contesting the validity of the counterparty’s ownership of intellectual property or otherwise bringing a claim against the counterparty for matters unrelated to the contract?",
    ),
    (
        "Third Party Beneficiary",
        "Is there a non-contracting party who is a beneficiary to some or all of the clauses in the contract and therefore can enforce its rights against a contracting party?",
    ),
];

/// A clause category paired with the question asked of the reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClauseQuestion {
    pub category: &'static str,
    pub question: String,
}

impl ClauseQuestion {
    fn new(category: &'static str, details: &str) -> Self {
        Self {
            category,
            question: format!("{QUESTION_PREFIX} \"{category}\" {QUESTION_SUFFIX} {details}"),
        }
    }
}

/// The 41 clause questions, sorted by category name.
///
/// Built once and shared for the life of the process.
pub fn load_categories_and_questions() -> &'static [ClauseQuestion] {
    static CATALOGUE: OnceLock<Vec<ClauseQuestion>> = OnceLock::new();
    CATALOGUE.get_or_init(|| {
        let mut questions: Vec<ClauseQuestion> = CLAUSES
            .iter()
            .map(|&(category, details)| ClauseQuestion::new(category, details))
            .collect();
        questions.sort_by(|a, b| a.category.cmp(b.category));
        questions
    })
}

/// Resolve a question string to the category it asks about.
///
/// Matches on the quoted category name, so categories whose names appear
/// unquoted inside another question's details (e.g. "Exclusivity" inside the
/// "Competitive Restriction Exception" description) never collide.
pub fn display_category(question: &str) -> Option<&'static str> {
    load_categories_and_questions()
        .iter()
        .find(|q| question.contains(&format!("\"{}\"", q.category)))
        .map(|q| q.category)
}

/// Case-insensitive lookup by category name.
pub fn find_category(name: &str) -> Option<&'static ClauseQuestion> {
    let name = name.trim();
    load_categories_and_questions()
        .iter()
        .find(|q| q.category.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_has_41_entries() {
        assert_eq!(load_categories_and_questions().len(), 41);
    }

    #[test]
    fn catalogue_sorted_by_category() {
        let questions = load_categories_and_questions();
        for pair in questions.windows(2) {
            assert!(
                pair[0].category < pair[1].category,
                "{:?} should sort before {:?}",
                pair[0].category,
                pair[1].category
            );
        }
        assert_eq!(questions[0].category, "Affiliate License-Licensee");
        assert_eq!(questions[40].category, "Warranty Duration");
    }

    #[test]
    fn question_stays_aligned_with_category() {
        for q in load_categories_and_questions() {
            assert!(
                q.question.contains(&format!("\"{}\"", q.category)),
                "question for {} does not mention it: {}",
                q.category,
                q.question
            );
            assert!(q.question.starts_with(QUESTION_PREFIX));
        }
    }

    #[test]
    fn governing_law_question_text() {
        let q = find_category("Governing Law").unwrap();
        assert_eq!(
            q.question,
            "Highlight the parts (if any) of this contract related to \"Governing Law\" that should be reviewed by a lawyer. Details: Which state/countrys law governs the interpretation of the contract?"
        );
    }

    #[test]
    fn question_text_keeps_non_breaking_spaces() {
        let nbsp = |category: &str| {
            find_category(category)
                .unwrap()
                .question
                .matches('\u{a0}')
                .count()
        };
        assert!(
            find_category("Effective Date")
                .unwrap()
                .question
                .ends_with("effective\u{a0}")
        );
        assert_eq!(nbsp("Exclusivity"), 3);
        assert_eq!(nbsp("Warranty Duration"), 2);
        assert_eq!(nbsp("Governing Law"), 0);
        let total: usize = load_categories_and_questions()
            .iter()
            .map(|q| q.question.matches('\u{a0}').count())
            .sum();
        assert_eq!(total, 18);
    }

    #[test]
    fn display_category_resolves_every_question() {
        for q in load_categories_and_questions() {
            assert_eq!(display_category(&q.question), Some(q.category));
        }
    }

    #[test]
    fn display_category_unambiguous() {
        // Only one quoted category name appears in each question.
        let questions = load_categories_and_questions();
        for q in questions {
            let hits = questions
                .iter()
                .filter(|other| q.question.contains(&format!("\"{}\"", other.category)))
                .count();
            assert_eq!(hits, 1, "{} matched {hits} categories", q.category);
        }
    }

    #[test]
    fn display_category_unknown_text() {
        assert_eq!(display_category("What is the meaning of life?"), None);
    }

    #[test]
    fn find_category_ignores_case_and_whitespace() {
        assert_eq!(
            find_category("  governing law ").map(|q| q.category),
            Some("Governing Law")
        );
        assert!(find_category("Severability").is_none());
    }

    #[test]
    fn catalogue_is_cached() {
        let a = load_categories_and_questions().as_ptr();
        let b = load_categories_and_questions().as_ptr();
        assert_eq!(a, b);
    }
}
