use {
    ::beautify::{
        commit_to_template,
        git2::RepositoryExt,
        propose_prefix,
        search,
        testing::{assert_display_eq, fixture_commit, TIMESTAMP},
        Error,
        OffsetPair,
        SearchOutcome,
    },
    expect_test::expect,
    git2::Repository,
};

#[test]
fn proposes_new_timestamps_for_head() {
    let repo = Repository::temporary().unwrap();
    fixture_commit(&repo, "initial\n").unwrap();

    let (_, raw) = repo.raw_commit("HEAD").unwrap();
    let (template, fields) = commit_to_template(&raw).unwrap();
    assert_eq!(fields.author.seconds, TIMESTAMP);
    assert_eq!(fields.committer.timezone, "+0200");

    let proposal = match search(&template, &fields, "00", 30).unwrap() {
        SearchOutcome::Found(proposal) => proposal,
        SearchOutcome::NoOp => panic!("08930cb already has no prefix 00"),
    };
    assert_eq!(proposal.offsets, OffsetPair::new(33, 39));
    assert_eq!(proposal.candidates, 814);
    assert_eq!(
        proposal.id.to_string(),
        "005c1c636745cb0c77bdfd95c3105539461c3e04"
    );
    assert_display_eq(
        expect![[
            "GIT_COMMITTER_DATE='1317498896 +0200' git commit --amend -C HEAD --date='1317498890 +0200'"
        ]],
        &proposal,
    );
}

#[test]
fn proposal_matches_git() {
    let repo = Repository::temporary().unwrap();
    fixture_commit(&repo, "initial\n").unwrap();

    let (_, raw) = repo.raw_commit("HEAD").unwrap();
    let (template, fields) = commit_to_template(&raw).unwrap();
    let proposal = match search(&template, &fields, "abc", 30).unwrap() {
        SearchOutcome::Found(proposal) => proposal,
        SearchOutcome::NoOp => panic!("08930cb already has no prefix abc"),
    };
    assert_eq!(proposal.offsets, OffsetPair::new(37, 68));

    let head = repo.head().unwrap().peel_to_commit().unwrap();
    let author = git2::Signature::new(
        "Dev",
        "dev@example.com",
        &git2::Time::new(proposal.author.seconds, 120),
    )
    .unwrap();
    let committer = git2::Signature::new(
        "Dev",
        "dev@example.com",
        &git2::Time::new(proposal.committer.seconds, 120),
    )
    .unwrap();
    let amended = head
        .amend(None, Some(&author), Some(&committer), None, None, None)
        .unwrap();
    assert_eq!(amended, proposal.id);
    assert!(amended.to_string().starts_with("abc"));
}

#[test]
fn nothing_to_do_when_prefix_already_matches() {
    let repo = Repository::temporary().unwrap();
    fixture_commit(&repo, "initial\n").unwrap();

    let (_, raw) = repo.raw_commit("HEAD").unwrap();
    let (template, fields) = commit_to_template(&raw).unwrap();
    assert_eq!(
        search(&template, &fields, "08930c", 30).unwrap(),
        SearchOutcome::NoOp
    );
}

#[test]
fn long_prefixes_exhaust_the_search() {
    let repo = Repository::temporary().unwrap();
    fixture_commit(&repo, "initial\n").unwrap();

    let (_, raw) = repo.raw_commit("HEAD").unwrap();
    let (template, fields) = commit_to_template(&raw).unwrap();
    assert!(matches!(
        search(&template, &fields, "0000000000", 2),
        Err(Error::Exhausted {
            candidates: 7381,
            ..
        })
    ));
}

#[test]
fn automatic_prefixes() {
    let repo = Repository::temporary().unwrap();
    fixture_commit(&repo, "initial\n").unwrap();

    let previous = repo.resolve_commit_id("HEAD^").unwrap();
    assert_eq!(previous, None);
    assert_eq!(propose_prefix(None, 4, "a").unwrap(), "0001a");

    fixture_commit(&repo, "second\n").unwrap();
    let previous = repo
        .resolve_commit_id("HEAD^")
        .unwrap()
        .map(|id| id.to_string());
    assert_eq!(
        previous.as_deref(),
        Some("08930cb0f51dcb8e18f66fbd93debba957671200")
    );
    assert_eq!(
        propose_prefix(previous.as_deref(), 4, "a").unwrap(),
        "0894a"
    );
    assert!(matches!(
        propose_prefix(previous.as_deref(), 6, "a"),
        Err(Error::UnderivablePrefix { .. })
    ));
}
